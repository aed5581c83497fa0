/// Identifier for a plant organism.
///
/// Ids are issued monotonically by
/// [`crate::manager::PlantManager`] and are never reused, so a
/// `PlantId` stored in a grid cell either resolves to a live plant
/// or marks a cell that is about to be released.
pub type PlantId = u32;

mod cave;
mod debris;
mod grid;
mod level;
mod segment;
mod terrain;
mod texture;
mod voxelize;

pub use cave::*;
pub use debris::*;
pub use grid::*;
pub use level::*;
pub use segment::*;
pub use terrain::*;
pub use texture::*;
pub use voxelize::*;

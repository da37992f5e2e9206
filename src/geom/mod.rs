mod area;
mod bbox;
mod index;
mod proj;
mod repair;
mod wkt;

pub use area::{AreaMethod, area_sq_meters};
pub use index::CountyIndex;
pub use proj::reproject_to_utm;
pub use repair::make_valid;
pub use wkt::parse_multipolygon;

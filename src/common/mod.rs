mod csv;
#[cfg(feature = "download")]
mod download;
mod fs;
mod shp;

pub(crate) use csv::*;
#[cfg(feature = "download")]
pub(crate) use download::*;
pub(crate) use fs::*;
pub(crate) use shp::*;

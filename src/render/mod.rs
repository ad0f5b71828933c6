pub(crate) mod ladder;
pub(crate) mod raster;
pub(crate) mod renderer;
pub(crate) mod sink;

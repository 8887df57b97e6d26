pub(crate) mod frame;
pub(crate) mod ppm;
pub(crate) mod sequence;

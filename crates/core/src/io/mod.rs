//! I/O operations for reading and writing 2-D TIFF images

mod native;

pub use native::{
    read_tiff, read_tiff_from_buffer, write_tiff, write_tiff_to_buffer, SampleFormat,
    TiffOptions,
};

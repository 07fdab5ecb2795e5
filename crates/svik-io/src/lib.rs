pub mod header;
pub mod nrrd;
pub mod sparse_io;

pub use header::SparseHeader;
pub use sparse_io::{
    header_path_for, read_entry_count, read_sparse_header, read_sparse_vector_image,
    write_sparse_vector_image,
};

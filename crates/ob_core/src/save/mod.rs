// Tournament export/import
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;

pub use error::ExportError;
pub use format::{
    decompress_and_deserialize, read_export, serialize_and_compress, write_export,
    TournamentExport,
};

pub const EXPORT_VERSION: u32 = 1;

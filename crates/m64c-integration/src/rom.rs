//! ROM image loading

use m64c_core::RomError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// A complete ROM image held in memory
#[derive(Debug, Clone)]
pub struct RomImage {
    path: PathBuf,
    data: Vec<u8>,
}

impl RomImage {
    /// Read the whole file at `path`
    ///
    /// The buffer is sized from the file length up front so an allocation
    /// failure is reported instead of aborting.
    pub fn load(path: &Path) -> Result<Self, RomError> {
        let mut file = File::open(path).map_err(|source| RomError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| RomError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if size == 0 {
            return Err(RomError::Empty {
                path: path.to_path_buf(),
            });
        }

        let len = usize::try_from(size).map_err(|_| RomError::Allocation {
            path: path.to_path_buf(),
            size,
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| RomError::Allocation {
            path: path.to_path_buf(),
            size,
        })?;
        data.resize(len, 0);

        file.read_exact(&mut data).map_err(|source| RomError::Read {
            path: path.to_path_buf(),
            size,
            source,
        })?;

        info!("Loaded ROM image '{}' ({} bytes)", path.display(), size);
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

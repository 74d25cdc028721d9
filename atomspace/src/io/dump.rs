//! Writing the contents of an [AtomSpace] as sorted text.

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{atomspace::AtomSpace, error::Error};

/// Write every atom of `atomspace` in ascending order, each followed by
/// a newline.
///
/// Returns the number of atoms written.
pub fn write_sorted<W: Write>(mut writer: W, atomspace: &AtomSpace) -> std::io::Result<usize> {
    let atoms = atomspace.sorted_atoms();
    for atom in &atoms {
        writeln!(writer, "{atom}")?;
    }
    writer.flush()?;

    Ok(atoms.len())
}

fn open_options(overwrite: bool) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);

    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    };

    options
}

/// Write the sorted atoms of `atomspace` to the file at `path`,
/// replacing its contents.
pub fn write_sorted_file<P: AsRef<Path>>(path: P, atomspace: &AtomSpace) -> Result<usize, Error> {
    write_sorted_file_with(path, atomspace, true)
}

/// Like [write_sorted_file], but fails if the file exists and
/// `overwrite` is not set.
pub fn write_sorted_file_with<P: AsRef<Path>>(
    path: P,
    atomspace: &AtomSpace,
    overwrite: bool,
) -> Result<usize, Error> {
    let path = path.as_ref();
    log::info!("writing atomspace \"{}\" to {}", atomspace.name(), path.display());

    let to_error = |error| Error::IOWriting {
        error,
        filename: path.to_path_buf(),
    };

    let file = open_options(overwrite).open(path).map_err(to_error)?;
    write_sorted(BufWriter::new(file), atomspace).map_err(to_error)
}

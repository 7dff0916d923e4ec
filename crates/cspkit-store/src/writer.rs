use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Writes displayable values to a file, one per line.
///
/// Values must not render line breaks; every type in this workspace satisfies that.
#[derive(Debug)]
pub struct DataWriter {
    path: Utf8PathBuf,
    out: BufWriter<File>,
}

impl DataWriter {
    /// Creates (or truncates) `path`, creating missing parent directories.
    pub fn create(path: &Utf8Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        let file = File::create(path).with_context(|| format!("create {path}"))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn store(&mut self, value: &impl Display) -> anyhow::Result<()> {
        writeln!(self.out, "{value}").with_context(|| format!("write {}", self.path))
    }

    pub fn store_all<T: Display>(
        &mut self,
        values: impl IntoIterator<Item = T>,
    ) -> anyhow::Result<()> {
        for value in values {
            self.store(&value)?;
        }
        Ok(())
    }

    /// Flushes buffered lines. Dropping without closing may lose data silently.
    pub fn close(mut self) -> anyhow::Result<()> {
        self.out
            .flush()
            .with_context(|| format!("flush {}", self.path))
    }
}

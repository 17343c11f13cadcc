use crate::script::RenderedScript;
use ahash::AHashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;
pub const SCRIPT_EXTENSION: &str = "lua";

pub struct ScriptWriter {
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl ScriptWriter {
    pub fn new(filename: &Path) -> std::io::Result<Self> {
        let file = File::create(filename)?;
        let writer = BufWriter::with_capacity(WRITER_BUFFER_SIZE, file);

        Ok(Self {
            writer,
            bytes_written: 0,
        })
    }

    pub fn write_script(&mut self, script: &RenderedScript) -> std::io::Result<()> {
        script.write_to(&mut self.writer)?;
        self.bytes_written += script.text.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// One script file per script name under a shared output directory
pub struct WriterPool {
    output_dir: PathBuf,
    writers: AHashMap<String, ScriptWriter>,
}

impl WriterPool {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            writers: AHashMap::new(),
        }
    }

    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, SCRIPT_EXTENSION))
    }

    pub fn get_writer(&mut self, name: &str) -> std::io::Result<&mut ScriptWriter> {
        use std::collections::hash_map::Entry;

        let path = self.script_path(name);
        match self.writers.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let writer = ScriptWriter::new(&path)?;
                Ok(entry.insert(writer))
            }
        }
    }

    pub fn write_script(&mut self, script: &RenderedScript) -> std::io::Result<PathBuf> {
        let path = self.script_path(&script.name);
        let writer = self.get_writer(&script.name)?;
        writer.write_script(script)?;
        Ok(path)
    }

    pub fn close_all(&mut self) -> std::io::Result<()> {
        for (_, writer) in self.writers.iter_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

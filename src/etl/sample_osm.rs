use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::data::osm::ElementKind;
use crate::errors::Result;
use crate::reader::open_osm;

use super::{remove_outputs, Etl};

pub const ETL_NAME: &str = "sample_osm";
pub const OUTPUT_FILE_NAME: &str = "sample.osm";

/// Copies every k-th top-level node, way or relation, children included.
pub struct Sampler<R: BufRead> {
    reader: Reader<R>,
    every: usize,
    seen: usize,
}

impl<R: BufRead> Sampler<R> {
    pub fn new(reader: Reader<R>, every: usize) -> Result<Self> {
        if every == 0 {
            return Err("Sample interval must be at least 1".into());
        }
        Ok(Sampler {
            reader,
            every,
            seen: 0,
        })
    }

    fn is_sampled(&mut self, el: &BytesStart) -> bool {
        if ElementKind::from_name(el.name().as_ref()).is_none() {
            return false;
        }
        let sampled = self.seen % self.every == 0;
        self.seen += 1;
        sampled
    }

    /// Writes the sampled elements as a standalone document and returns how
    /// many top-level elements were kept.
    pub fn write_to<W: Write>(mut self, writer: &mut Writer<W>) -> Result<usize> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("osm")))?;

        let mut buf = Vec::new();
        // Depth 1 is directly below the document root.
        let mut depth = 0usize;
        let mut keeping = false;
        let mut kept = 0usize;

        loop {
            let event = self.reader.read_event_into(&mut buf)?;
            match &event {
                Event::Eof => break,
                Event::Start(e) => {
                    if depth == 1 {
                        keeping = self.is_sampled(e);
                        kept += usize::from(keeping);
                    }
                    if keeping {
                        writer.write_event(&event)?;
                    }
                    depth += 1;
                },
                Event::Empty(e) => {
                    if depth == 1 {
                        keeping = self.is_sampled(e);
                        kept += usize::from(keeping);
                    }
                    if keeping {
                        writer.write_event(&event)?;
                    }
                    if depth == 1 {
                        keeping = false;
                    }
                },
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if keeping {
                        writer.write_event(&event)?;
                    }
                    if depth <= 1 {
                        keeping = false;
                    }
                },
                Event::Text(_) | Event::CData(_) => {
                    if keeping {
                        writer.write_event(&event)?;
                    }
                },
                _ => (),
            }
            buf.clear();
        }

        writer.write_event(Event::End(BytesEnd::new("osm")))?;
        Ok(kept)
    }
}

pub struct SampleOsmEtl<'a> {
    input_path: &'a Path,
    every: usize,
}

impl<'a> SampleOsmEtl<'a> {
    pub fn new(input_path: &'a Path, every: usize) -> Self {
        SampleOsmEtl { input_path, every }
    }
}

impl Etl for SampleOsmEtl<'_> {
    type Input = Reader<Box<dyn BufRead + Send>>;
    type Output = Sampler<Box<dyn BufRead + Send>>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(OUTPUT_FILE_NAME).exists())
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_outputs(dir, &[OUTPUT_FILE_NAME])
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm(self.input_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        Sampler::new(input, self.every)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let output_file = File::create(dir.join(OUTPUT_FILE_NAME))?;
        let mut writer = Writer::new(BufWriter::new(output_file));
        let kept = output.write_to(&mut writer)?;
        writer.into_inner().flush()?;
        info!(etl_name = ETL_NAME, kept = kept, every = self.every; "Sample written");
        Ok(())
    }
}

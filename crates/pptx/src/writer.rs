//! PPTX package writer.

use crate::parts::{self, LAYOUT_PATH, MASTER_PATH, SLIDE_LAYOUT, SLIDE_MASTER, THEME_PATH};
use crate::slide::{build_slide, png_dimensions, PlacedImage};
use crate::template::Template;
use lecture_core::{Error, Result, SlideDescriptor};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes planned slides as a PowerPoint package.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    template: Template,
}

impl PptxWriter {
    /// Create a writer using the built-in theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the theme from `template`.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Write the deck to `path`.
    pub fn save(&self, slides: &[SlideDescriptor], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = self.write(slides, BufWriter::new(file))?;
        writer.flush()?;
        log::info!("Wrote {} slides to {}", slides.len(), path.display());
        Ok(())
    }

    /// Write the deck into `writer`, returning it once the archive is closed.
    ///
    /// Content-slide equation images that cannot be read are left out.
    pub fn write<W: Write + Seek>(&self, slides: &[SlideDescriptor], writer: W) -> Result<W> {
        let mut package = Package::new(writer);

        package.add(
            "[Content_Types].xml",
            parts::content_types(slides.len())?.as_bytes(),
        )?;
        package.add("_rels/.rels", parts::root_relationships()?.as_bytes())?;
        package.add(
            "ppt/presentation.xml",
            parts::presentation(slides.len())?.as_bytes(),
        )?;
        package.add(
            "ppt/_rels/presentation.xml.rels",
            parts::presentation_relationships(slides.len())?.as_bytes(),
        )?;
        package.add(MASTER_PATH, SLIDE_MASTER.as_bytes())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::master_relationships()?.as_bytes(),
        )?;
        package.add(LAYOUT_PATH, SLIDE_LAYOUT.as_bytes())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            parts::layout_relationships()?.as_bytes(),
        )?;
        package.add(THEME_PATH, self.template.theme().as_bytes())?;

        let mut media_count = 0;
        for (i, slide) in slides.iter().enumerate() {
            let number = i + 1;
            let mut images = Vec::new();

            if let SlideDescriptor::Content { equations, .. } = slide {
                for path in equations {
                    let bytes = match std::fs::read(path) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            log::warn!("Skipping equation image {}: {}", path.display(), e);
                            continue;
                        }
                    };
                    media_count += 1;
                    let name = format!("image{}.png", media_count);
                    package.add(&format!("ppt/media/{}", name), &bytes)?;
                    images.push(PlacedImage {
                        target: format!("../media/{}", name),
                        pixels: png_dimensions(&bytes),
                    });
                }
            }

            let part = build_slide(slide, &images)?;
            package.add(&format!("ppt/slides/slide{}.xml", number), part.xml.as_bytes())?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                part.rels.as_bytes(),
            )?;
        }

        log::debug!("Packaged {} slides, {} images", slides.len(), media_count);
        package.finish()
    }
}

/// ZIP archive being assembled.
struct Package<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions,
}

impl<W: Write + Seek> Package<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn add(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
        self.zip.write_all(content)?;
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.zip
            .finish()
            .map_err(|e| Error::PptxWriteError(format!("Failed to finish package: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::{Cursor, Read};
    use std::path::PathBuf;
    use zip::ZipArchive;

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> String {
        let mut file = archive.by_name(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    /// Collect the text runs of a slide part in document order.
    fn slide_texts(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut texts = Vec::new();
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"a:t" => in_text = true,
                Ok(Event::End(ref e)) if e.name().as_ref() == b"a:t" => in_text = false,
                Ok(Event::Text(ref e)) if in_text => {
                    texts.push(e.unescape().unwrap_or_default().to_string());
                }
                Ok(Event::Eof) => break,
                Err(e) => panic!("invalid slide XML: {}", e),
                _ => {}
            }
        }

        texts
    }

    fn deck() -> Vec<SlideDescriptor> {
        vec![
            SlideDescriptor::Title {
                text: "Chapter 1".to_string(),
            },
            SlideDescriptor::SectionHeader {
                text: "Arbitrage".to_string(),
            },
            SlideDescriptor::Content {
                title: "Arbitrage".to_string(),
                bullets: vec!["No free lunch".to_string(), "One price".to_string()],
                equations: vec![PathBuf::from("/nonexistent/equation_000.png")],
            },
        ]
    }

    #[test]
    fn test_package_structure() {
        let bytes = PptxWriter::new()
            .write(&deck(), Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            MASTER_PATH,
            LAYOUT_PATH,
            THEME_PATH,
            "ppt/slides/slide1.xml",
            "ppt/slides/slide3.xml",
            "ppt/slides/_rels/slide3.xml.rels",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {}", part);
        }
        assert!(archive.by_name("ppt/slides/slide4.xml").is_err());
        // The unreadable image was skipped
        assert!(archive.by_name("ppt/media/image1.png").is_err());
    }

    #[test]
    fn test_slide_text_in_order() {
        let bytes = PptxWriter::new()
            .write(&deck(), Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(
            slide_texts(&read_part(&mut archive, "ppt/slides/slide1.xml")),
            vec!["Chapter 1"]
        );
        assert_eq!(
            slide_texts(&read_part(&mut archive, "ppt/slides/slide2.xml")),
            vec!["Arbitrage"]
        );
        assert_eq!(
            slide_texts(&read_part(&mut archive, "ppt/slides/slide3.xml")),
            vec!["Arbitrage", "No free lunch", "One price"]
        );
    }

    #[test]
    fn test_equation_images_embedded() {
        let dir = std::env::temp_dir().join(format!("lecture-pptx-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let image = dir.join("equation_000.png");
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&200u32.to_be_bytes());
        png.extend_from_slice(&50u32.to_be_bytes());
        std::fs::write(&image, &png).unwrap();

        let slides = vec![SlideDescriptor::Content {
            title: "Math".to_string(),
            bullets: vec![],
            equations: vec![image.clone()],
        }];
        let bytes = PptxWriter::new()
            .write(&slides, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut stored = Vec::new();
        archive
            .by_name("ppt/media/image1.png")
            .unwrap()
            .read_to_end(&mut stored)
            .unwrap();
        assert_eq!(stored, png);

        let rels = read_part(&mut archive, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("Target=\"../media/image1.png\""));
        let slide = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("r:embed=\"rId2\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_template_theme_is_used() {
        let template = Template::from_reader({
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            zip.start_file(THEME_PATH, FileOptions::default()).unwrap();
            zip.write_all(b"<a:theme name=\"Corporate\"/>").unwrap();
            Cursor::new(zip.finish().unwrap().into_inner())
        })
        .unwrap();

        let bytes = PptxWriter::new()
            .with_template(template)
            .write(&deck(), Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(read_part(&mut archive, THEME_PATH), "<a:theme name=\"Corporate\"/>");
    }

    #[test]
    fn test_empty_deck() {
        let bytes = PptxWriter::new()
            .write(&[], Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert!(!presentation.contains("p:sldIdLst"));
    }
}

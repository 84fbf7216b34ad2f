//! Thin event-writing helper over `quick_xml::Writer`.

use lecture_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Namespace of DrawingML elements (`a:`).
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Namespace of relationship references (`r:`).
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Namespace of PresentationML elements (`p:`).
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Builds one XML part in memory.
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Start a part with the standard standalone declaration.
    pub fn new() -> Result<Self> {
        let mut builder = Self {
            writer: Writer::new(Vec::new()),
        };
        builder.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(builder)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }

    /// Open an element.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Start(element))?;
        Ok(self)
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Empty(element))?;
        Ok(self)
    }

    /// Write escaped character data.
    pub fn text(&mut self, text: &str) -> Result<&mut Self> {
        self.write(Event::Text(BytesText::new(text)))?;
        Ok(self)
    }

    /// Close an element.
    pub fn end(&mut self, name: &str) -> Result<&mut Self> {
        self.write(Event::End(BytesEnd::new(name)))?;
        Ok(self)
    }

    /// `<name>text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self> {
        self.start(name, &[])?.text(text)?.end(name)
    }

    /// Finish the part and return it as a string.
    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Generated XML is not UTF-8: {}", e)))
    }
}

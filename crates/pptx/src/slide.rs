//! Slide part generation for each descriptor kind.

use crate::parts::{Relationship, SLIDE_WIDTH};
use crate::xml::{XmlBuilder, NS_A, NS_P, NS_R};
use lecture_core::{Result, SlideDescriptor};

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

const TITLE_COLOR: &str = "003366";
const TEXT_COLOR: &str = "000000";

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    fn from_inches(x: f64, y: f64, cx: f64, cy: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(cx),
            cy: inches(cy),
        }
    }
}

/// An equation image placed on a slide, already stored in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedImage {
    /// Media target relative to the slide, e.g. `../media/image3.png`.
    pub target: String,
    /// Pixel dimensions, if the PNG header could be read.
    pub pixels: Option<(u32, u32)>,
}

/// Serialized slide part plus its relationships.
pub struct SlidePart {
    pub xml: String,
    pub rels: String,
}

/// Text run styling.
struct RunStyle {
    size: u32,
    bold: bool,
    color: &'static str,
}

impl RunStyle {
    fn heading(size: u32) -> Self {
        Self {
            size,
            bold: true,
            color: TITLE_COLOR,
        }
    }

    fn body(size: u32) -> Self {
        Self {
            size,
            bold: false,
            color: TEXT_COLOR,
        }
    }
}

/// Build the slide XML for `slide`; `images` are the stored equation images
/// for a content slide, in display order.
pub fn build_slide(slide: &SlideDescriptor, images: &[PlacedImage]) -> Result<SlidePart> {
    let mut shapes = ShapeTree::new()?;

    match slide {
        SlideDescriptor::Title { text } => {
            shapes.text_box(
                "Title",
                Frame::from_inches(0.5, 2.5, 9.0, 1.5),
                &[text.as_str()],
                &RunStyle::heading(44),
                false,
            )?;
        }
        SlideDescriptor::SectionHeader { text } => {
            shapes.text_box(
                "Section Title",
                Frame::from_inches(0.5, 3.0, 9.0, 1.2),
                &[text.as_str()],
                &RunStyle::heading(40),
                false,
            )?;
        }
        SlideDescriptor::Content { title, bullets, .. } => {
            shapes.text_box(
                "Title",
                Frame::from_inches(0.5, 0.4, 9.0, 1.0),
                &[title.as_str()],
                &RunStyle::heading(32),
                false,
            )?;

            if !bullets.is_empty() {
                let lines: Vec<&str> = bullets.iter().map(String::as_str).collect();
                shapes.text_box(
                    "Content",
                    Frame::from_inches(0.5, 1.5, 9.0, 2.4),
                    &lines,
                    &RunStyle::body(18),
                    true,
                )?;
            }

            let mut top = if bullets.is_empty() { inches(2.0) } else { inches(4.0) };
            for (i, image) in images.iter().enumerate() {
                let height = EMU_PER_INCH;
                shapes.picture(
                    &format!("Equation {}", i + 1),
                    &image_rel_id(i),
                    Frame {
                        x: inches(2.0),
                        y: top,
                        cx: scaled_width(image.pixels, height),
                        cy: height,
                    },
                )?;
                top += inches(1.2);
            }
        }
    }

    let mut rels = vec![Relationship::new(
        "rId1",
        "slideLayout",
        "../slideLayouts/slideLayout1.xml",
    )];
    for (i, image) in images.iter().enumerate() {
        rels.push(Relationship::new(image_rel_id(i), "image", image.target.clone()));
    }

    Ok(SlidePart {
        xml: shapes.finish()?,
        rels: crate::parts::relationships(&rels)?,
    })
}

/// Relationship id of the `index`-th image on a slide (rId1 is the layout).
fn image_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

/// Width preserving the PNG aspect ratio at `height`, capped to fit the
/// slide to the right of the 2in margin.
fn scaled_width(pixels: Option<(u32, u32)>, height: i64) -> i64 {
    let max_width = SLIDE_WIDTH - inches(2.5);
    match pixels {
        Some((w, h)) if w > 0 && h > 0 => {
            let width = (height as f64 * w as f64 / h as f64).round() as i64;
            width.min(max_width)
        }
        _ => height * 4,
    }
}

/// Read width and height from a PNG IHDR chunk.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.len() < 24 || !bytes.starts_with(SIGNATURE) || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some((width, height))
}

/// Writer for a slide's `p:spTree`, handing out shape ids.
struct ShapeTree {
    xml: XmlBuilder,
    next_id: u32,
}

impl ShapeTree {
    fn new() -> Result<Self> {
        let mut xml = XmlBuilder::new()?;
        xml.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?
            .start("p:cSld", &[])?
            .start("p:spTree", &[])?
            .start("p:nvGrpSpPr", &[])?
            .empty("p:cNvPr", &[("id", "1"), ("name", "")])?
            .empty("p:cNvGrpSpPr", &[])?
            .empty("p:nvPr", &[])?
            .end("p:nvGrpSpPr")?
            .start("p:grpSpPr", &[])?
            .start("a:xfrm", &[])?
            .empty("a:off", &[("x", "0"), ("y", "0")])?
            .empty("a:ext", &[("cx", "0"), ("cy", "0")])?
            .empty("a:chOff", &[("x", "0"), ("y", "0")])?
            .empty("a:chExt", &[("cx", "0"), ("cy", "0")])?
            .end("a:xfrm")?
            .end("p:grpSpPr")?;
        Ok(Self { xml, next_id: 2 })
    }

    fn allocate_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    fn transform(&mut self, frame: Frame) -> Result<()> {
        let (x, y) = (frame.x.to_string(), frame.y.to_string());
        let (cx, cy) = (frame.cx.to_string(), frame.cy.to_string());
        self.xml
            .start("a:xfrm", &[])?
            .empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?
            .empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?
            .end("a:xfrm")?
            .start("a:prstGeom", &[("prst", "rect")])?
            .empty("a:avLst", &[])?
            .end("a:prstGeom")?;
        Ok(())
    }

    /// A text box with one paragraph per line; `bulleted` adds bullet
    /// characters and a hanging indent.
    fn text_box(
        &mut self,
        name: &str,
        frame: Frame,
        lines: &[&str],
        style: &RunStyle,
        bulleted: bool,
    ) -> Result<()> {
        let id = self.allocate_id();
        let label = format!("{} {}", name, id);
        let size = (style.size * 100).to_string();
        let bold = if style.bold { "1" } else { "0" };

        self.xml
            .start("p:sp", &[])?
            .start("p:nvSpPr", &[])?
            .empty("p:cNvPr", &[("id", id.as_str()), ("name", label.as_str())])?
            .empty("p:cNvSpPr", &[("txBox", "1")])?
            .empty("p:nvPr", &[])?
            .end("p:nvSpPr")?
            .start("p:spPr", &[])?;
        self.transform(frame)?;
        self.xml.end("p:spPr")?.start("p:txBody", &[])?;

        let anchor = if bulleted { "t" } else { "ctr" };
        self.xml
            .empty("a:bodyPr", &[("wrap", "square"), ("anchor", anchor)])?
            .empty("a:lstStyle", &[])?;

        for line in lines {
            self.xml.start("a:p", &[])?;
            if bulleted {
                self.xml
                    .start("a:pPr", &[("marL", "342900"), ("indent", "-342900"), ("lvl", "0")])?
                    .empty("a:buFont", &[("typeface", "Arial")])?
                    .empty("a:buChar", &[("char", "\u{2022}")])?
                    .end("a:pPr")?;
            } else {
                self.xml.empty("a:pPr", &[("algn", "ctr")])?;
            }
            self.xml
                .start("a:r", &[])?
                .start(
                    "a:rPr",
                    &[
                        ("lang", "en-US"),
                        ("sz", size.as_str()),
                        ("b", bold),
                        ("dirty", "0"),
                    ],
                )?
                .start("a:solidFill", &[])?
                .empty("a:srgbClr", &[("val", style.color)])?
                .end("a:solidFill")?
                .end("a:rPr")?
                .text_element("a:t", line)?
                .end("a:r")?
                .end("a:p")?;
        }

        self.xml.end("p:txBody")?.end("p:sp")?;
        Ok(())
    }

    fn picture(&mut self, name: &str, rel_id: &str, frame: Frame) -> Result<()> {
        let id = self.allocate_id();
        self.xml
            .start("p:pic", &[])?
            .start("p:nvPicPr", &[])?
            .empty("p:cNvPr", &[("id", id.as_str()), ("name", name)])?
            .start("p:cNvPicPr", &[])?
            .empty("a:picLocks", &[("noChangeAspect", "1")])?
            .end("p:cNvPicPr")?
            .empty("p:nvPr", &[])?
            .end("p:nvPicPr")?
            .start("p:blipFill", &[])?
            .empty("a:blip", &[("r:embed", rel_id)])?
            .start("a:stretch", &[])?
            .empty("a:fillRect", &[])?
            .end("a:stretch")?
            .end("p:blipFill")?
            .start("p:spPr", &[])?;
        self.transform(frame)?;
        self.xml.end("p:spPr")?.end("p:pic")?;
        Ok(())
    }

    fn finish(mut self) -> Result<String> {
        self.xml
            .end("p:spTree")?
            .end("p:cSld")?
            .start("p:clrMapOvr", &[])?
            .empty("a:masterClrMapping", &[])?
            .end("p:clrMapOvr")?
            .end("p:sld")?;
        self.xml.finish()
    }
}

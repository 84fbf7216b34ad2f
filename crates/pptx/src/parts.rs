//! Package-level parts: content types, relationships, presentation,
//! master, layout and the default theme.

use crate::xml::{XmlBuilder, NS_A, NS_P, NS_R};
use lecture_core::Result;

/// 4:3 slide width (10in) in EMU.
pub const SLIDE_WIDTH: i64 = 9_144_000;
/// 4:3 slide height (7.5in) in EMU.
pub const SLIDE_HEIGHT: i64 = 6_858_000;

pub const MASTER_PATH: &str = "ppt/slideMasters/slideMaster1.xml";
pub const LAYOUT_PATH: &str = "ppt/slideLayouts/slideLayout1.xml";
pub const THEME_PATH: &str = "ppt/theme/theme1.xml";

const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";

/// Relationship type URI for `kind` (e.g. "slide", "theme").
pub fn rel_type(kind: &str) -> String {
    format!("{}/{}", REL_BASE, kind)
}

/// A single `<Relationship>` entry.
pub struct Relationship {
    pub id: String,
    pub kind: String,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, kind: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: rel_type(kind),
            target: target.into(),
        }
    }
}

/// Serialize a `.rels` part.
pub fn relationships(rels: &[Relationship]) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_RELS_NS)])?;
    for rel in rels {
        xml.empty(
            "Relationship",
            &[
                ("Id", rel.id.as_str()),
                ("Type", rel.kind.as_str()),
                ("Target", rel.target.as_str()),
            ],
        )?;
    }
    xml.end("Relationships")?;
    xml.finish()
}

/// `[Content_Types].xml` for a deck with `slide_count` slides.
pub fn content_types(slide_count: usize) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty("Default", &[("Extension", "png"), ("ContentType", "image/png")])?;

    let overrides = [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
    ];
    for (part, kind) in overrides {
        let content_type = format!("{}.{}", CT_BASE, kind);
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type.as_str())])?;
    }

    let slide_type = format!("{}.presentationml.slide+xml", CT_BASE);
    for number in 1..=slide_count {
        let part = format!("/ppt/slides/slide{}.xml", number);
        xml.empty(
            "Override",
            &[
                ("PartName", part.as_str()),
                ("ContentType", slide_type.as_str()),
            ],
        )?;
    }

    xml.end("Types")?;
    xml.finish()
}

/// `_rels/.rels`
pub fn root_relationships() -> Result<String> {
    relationships(&[Relationship::new(
        "rId1",
        "officeDocument",
        "ppt/presentation.xml",
    )])
}

/// Relationship id of slide `number` (1-based) in `presentation.xml.rels`.
///
/// rId1 is the master and rId2 the theme.
pub fn slide_rel_id(number: usize) -> String {
    format!("rId{}", number + 2)
}

/// `ppt/presentation.xml`
pub fn presentation(slide_count: usize) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    xml.start("p:sldMasterIdLst", &[])?
        .empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?
        .end("p:sldMasterIdLst")?;

    if slide_count > 0 {
        xml.start("p:sldIdLst", &[])?;
        for number in 1..=slide_count {
            let id = (255 + number).to_string();
            let rel = slide_rel_id(number);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
        }
        xml.end("p:sldIdLst")?;
    }

    let (cx, cy) = (SLIDE_WIDTH.to_string(), SLIDE_HEIGHT.to_string());
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str()), ("type", "screen4x3")])?;
    xml.empty("p:notesSz", &[("cx", cy.as_str()), ("cy", cx.as_str())])?;
    xml.end("p:presentation")?;
    xml.finish()
}

/// `ppt/_rels/presentation.xml.rels`
pub fn presentation_relationships(slide_count: usize) -> Result<String> {
    let mut rels = vec![
        Relationship::new("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", "theme", "theme/theme1.xml"),
    ];
    for number in 1..=slide_count {
        rels.push(Relationship::new(
            slide_rel_id(number),
            "slide",
            format!("slides/slide{}.xml", number),
        ));
    }
    relationships(&rels)
}

pub fn master_relationships() -> Result<String> {
    relationships(&[
        Relationship::new("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        Relationship::new("rId2", "theme", "../theme/theme1.xml"),
    ])
}

pub fn layout_relationships() -> Result<String> {
    relationships(&[Relationship::new(
        "rId1",
        "slideMaster",
        "../slideMasters/slideMaster1.xml",
    )])
}

pub const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900" algn="l"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="3200" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr algn="l"><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#;

pub const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

pub const DEFAULT_THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Lecture"><a:themeElements><a:clrScheme name="Lecture"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="003366"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="003366"/></a:accent1><a:accent2><a:srgbClr val="FF6B35"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Lecture"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Lecture"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_lists_slides() {
        let xml = content_types(2).unwrap();
        assert!(xml.contains("PartName=\"/ppt/slides/slide1.xml\""));
        assert!(xml.contains("PartName=\"/ppt/slides/slide2.xml\""));
        assert!(!xml.contains("slide3.xml"));
        assert!(xml.contains("Extension=\"png\""));
    }

    #[test]
    fn test_presentation_slide_ids() {
        let xml = presentation(3).unwrap();
        assert!(xml.contains("<p:sldId id=\"256\" r:id=\"rId3\"/>"));
        assert!(xml.contains("<p:sldId id=\"258\" r:id=\"rId5\"/>"));
        assert!(xml.contains("cx=\"9144000\" cy=\"6858000\""));
    }

    #[test]
    fn test_presentation_relationships() {
        let xml = presentation_relationships(1).unwrap();
        assert!(xml.contains("Id=\"rId3\""));
        assert!(xml.contains("Target=\"slides/slide1.xml\""));
        assert!(xml.contains(&rel_type("theme")));
    }
}

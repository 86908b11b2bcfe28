//! Office Open XML writer for [`Deck`].
//!
//! Emits the smallest package PowerPoint and LibreOffice both open: one blank
//! layout, one master, one theme, and a slide part per slide.

use crate::export::deck::{Align, Color, Deck, Element, Frame, Shape, ShapeKind, Slide, TextBox};
use crate::export::deck::{SLIDE_HEIGHT, SLIDE_WIDTH};
use anyhow::Context;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const EMU_PER_INCH: f64 = 914_400.0;
const FONT_FACE: &str = "Meiryo UI";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub fn write_pptx(deck: &Deck) -> anyhow::Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut put = |name: &str, body: String| -> anyhow::Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options)
            .with_context(|| format!("start zip entry {name} failed"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("write zip entry {name} failed"))?;
        Ok(())
    };

    let n = deck.slides.len();
    put("[Content_Types].xml", content_types(n))?;
    put("_rels/.rels", root_rels())?;
    put("docProps/core.xml", core_props(deck))?;
    put("docProps/app.xml", app_props(deck))?;
    put("ppt/presentation.xml", presentation(n))?;
    put("ppt/_rels/presentation.xml.rels", presentation_rels(n))?;
    put("ppt/slideMasters/slideMaster1.xml", slide_master())?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ]),
    )?;
    put("ppt/slideLayouts/slideLayout1.xml", slide_layout())?;
    put(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
    )?;
    put("ppt/theme/theme1.xml", theme())?;

    for (i, slide) in deck.slides.iter().enumerate() {
        let idx = i + 1;
        put(&format!("ppt/slides/slide{idx}.xml"), slide_xml(slide))?;
        put(
            &format!("ppt/slides/_rels/slide{idx}.xml.rels"),
            rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        )?;
    }

    let cursor = zip.finish().context("finish pptx archive failed")?;
    Ok(cursor.into_inner())
}

/// Escapes markup and drops characters XML 1.0 cannot carry at all.
fn esc(s: &str) -> String {
    let allowed: String = s.chars().filter(|&c| is_xml_char(c)).collect();
    html_escape::encode_safe(&allowed).into_owned()
}

fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => c >= '\u{20}',
    }
}

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

fn content_types(slides: usize) -> String {
    let mut out = format!(
        "{XML_DECL}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>"
    );
    for i in 1..=slides {
        let _ = write!(
            out,
            "<Override PartName=\"/ppt/slides/slide{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        );
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    format!(
        "{XML_DECL}<Relationships xmlns=\"{NS_PKG_REL}\">\
<Relationship Id=\"rId1\" Type=\"{REL_BASE}/officeDocument\" Target=\"ppt/presentation.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
<Relationship Id=\"rId3\" Type=\"{REL_BASE}/extended-properties\" Target=\"docProps/app.xml\"/>\
</Relationships>"
    )
}

/// (id, relationship type suffix, target)
fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut out = format!("{XML_DECL}<Relationships xmlns=\"{NS_PKG_REL}\">");
    for (id, kind, target) in entries {
        let _ = write!(
            out,
            "<Relationship Id=\"{id}\" Type=\"{REL_BASE}/{kind}\" Target=\"{target}\"/>"
        );
    }
    out.push_str("</Relationships>");
    out
}

fn core_props(deck: &Deck) -> String {
    format!(
        "{XML_DECL}<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:title>{}</dc:title><dc:creator>{}</dc:creator><cp:lastModifiedBy>{}</cp:lastModifiedBy>\
</cp:coreProperties>",
        esc(&deck.title),
        esc(deck.author),
        esc(deck.author)
    )
}

fn app_props(deck: &Deck) -> String {
    format!(
        "{XML_DECL}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
<Application>{}</Application><Company>{}</Company><Slides>{}</Slides></Properties>",
        esc(deck.author),
        esc(deck.company),
        deck.slides.len()
    )
}

fn presentation(slides: usize) -> String {
    let mut ids = String::new();
    for i in 0..slides {
        let _ = write!(ids, "<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 2);
    }
    format!(
        "{XML_DECL}<p:presentation xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
<p:sldIdLst>{ids}</p:sldIdLst>\
<p:sldSz cx=\"{}\" cy=\"{}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
</p:presentation>",
        emu(SLIDE_WIDTH),
        emu(SLIDE_HEIGHT)
    )
}

fn presentation_rels(slides: usize) -> String {
    let targets: Vec<(String, &str, String)> = std::iter::once((
        "rId1".to_string(),
        "slideMaster",
        "slideMasters/slideMaster1.xml".to_string(),
    ))
    .chain((1..=slides).map(|i| (format!("rId{}", i + 1), "slide", format!("slides/slide{i}.xml"))))
    .chain(std::iter::once((
        format!("rId{}", slides + 2),
        "theme",
        "theme/theme1.xml".to_string(),
    )))
    .collect();

    let entries: Vec<(&str, &str, &str)> = targets
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels(&entries)
}

const EMPTY_TREE: &str = "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>";

fn slide_master() -> String {
    format!(
        "{XML_DECL}<p:sldMaster xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>\
<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" \
accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>\
</p:sldMaster>"
    )
}

fn slide_layout() -> String {
    format!(
        "{XML_DECL}<p:sldLayout xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\" type=\"blank\" preserve=\"1\">\
<p:cSld name=\"Blank\"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
    )
}

fn theme() -> String {
    let fill = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let line = format!("<a:ln w=\"9525\">{fill}</a:ln>");
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    format!(
        "{XML_DECL}<a:theme xmlns:a=\"{NS_A}\" name=\"InsureConsult\"><a:themeElements>\
<a:clrScheme name=\"InsureConsult\">\
<a:dk1><a:srgbClr val=\"000000\"/></a:dk1><a:lt1><a:srgbClr val=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"333333\"/></a:dk2><a:lt2><a:srgbClr val=\"F4F5F7\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"0052CC\"/></a:accent1><a:accent2><a:srgbClr val=\"00A388\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"F5A623\"/></a:accent3><a:accent4><a:srgbClr val=\"6366F1\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"EC4899\"/></a:accent5><a:accent6><a:srgbClr val=\"14B8A6\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"0052CC\"/></a:hlink><a:folHlink><a:srgbClr val=\"6B21A8\"/></a:folHlink>\
</a:clrScheme>\
<a:fontScheme name=\"InsureConsult\">\
<a:majorFont><a:latin typeface=\"{FONT_FACE}\"/><a:ea typeface=\"{FONT_FACE}\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"{FONT_FACE}\"/><a:ea typeface=\"{FONT_FACE}\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme>\
<a:fmtScheme name=\"InsureConsult\">\
<a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>\
<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>\
<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>\
<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>\
</a:fmtScheme></a:themeElements></a:theme>"
    )
}

fn slide_xml(slide: &Slide) -> String {
    let mut tree = String::new();
    for (i, element) in slide.elements.iter().enumerate() {
        // id 1 is the group root.
        let id = i + 2;
        match element {
            Element::Shape(shape) => shape_xml(&mut tree, id, shape),
            Element::Text(text) => text_xml(&mut tree, id, text),
        }
    }

    let background = slide
        .background
        .map(|Color(c)| {
            format!(
                "<p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"{c}\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"
            )
        })
        .unwrap_or_default();

    format!(
        "{XML_DECL}<p:sld xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:cSld>{background}<p:spTree>{EMPTY_TREE}{tree}</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
    )
}

fn xfrm(frame: &Frame) -> String {
    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
        emu(frame.x),
        emu(frame.y),
        emu(frame.w),
        emu(frame.h)
    )
}

fn shape_xml(out: &mut String, id: usize, shape: &Shape) {
    let prst = match shape.kind {
        ShapeKind::Rect => "rect",
        ShapeKind::RoundRect => "roundRect",
        ShapeKind::Oval => "ellipse",
    };
    let line = match shape.line {
        Some((Color(c), width_pt)) => format!(
            "<a:ln w=\"{}\"><a:solidFill><a:srgbClr val=\"{c}\"/></a:solidFill></a:ln>",
            (width_pt * 12_700.0).round() as i64
        ),
        None => "<a:ln><a:noFill/></a:ln>".to_string(),
    };
    let _ = write!(
        out,
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Shape {id}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
<p:spPr>{xfrm}<a:prstGeom prst=\"{prst}\"><a:avLst/></a:prstGeom>\
<a:solidFill><a:srgbClr val=\"{fill}\"/></a:solidFill>{line}</p:spPr></p:sp>",
        xfrm = xfrm(&shape.frame),
        fill = shape.fill.0,
    );
}

fn text_xml(out: &mut String, id: usize, text: &TextBox) {
    let algn = match text.align {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Right => "r",
    };
    let run_props = format!(
        "<a:rPr lang=\"ja-JP\" sz=\"{}\" b=\"{}\" i=\"{}\" dirty=\"0\"><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>\
<a:latin typeface=\"{FONT_FACE}\"/><a:ea typeface=\"{FONT_FACE}\"/></a:rPr>",
        text.size_pt * 100,
        u8::from(text.bold),
        u8::from(text.italic),
        text.color.0
    );

    let mut paragraphs = String::new();
    for line in text.text.lines() {
        let _ = write!(
            paragraphs,
            "<a:p><a:pPr algn=\"{algn}\"/><a:r>{run_props}<a:t>{}</a:t></a:r></a:p>",
            esc(line)
        );
    }
    if paragraphs.is_empty() {
        let _ = write!(paragraphs, "<a:p><a:pPr algn=\"{algn}\"/></a:p>");
    }

    let _ = write!(
        out,
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
<p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
<p:txBody><a:bodyPr wrap=\"square\" lIns=\"45720\" tIns=\"45720\" rIns=\"45720\" bIns=\"45720\" anchor=\"t\"><a:normAutofit/></a:bodyPr>\
<a:lstStyle/>{paragraphs}</p:txBody></p:sp>",
        xfrm = xfrm(&text.frame),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{ConsultantAnalysis, InsuranceRecommendation, ScoreSection};
    use crate::domain::financial::FinancialInput;
    use crate::export::deck::build_deck;
    use std::io::Read;

    fn deck() -> Deck {
        deck_with("株式会社テスト", "R&D <投資> を継続")
    }

    fn deck_with(company_name: &str, overall_summary: &str) -> Deck {
        let section = ScoreSection {
            score: 48,
            title: "t".to_string(),
            summary: "s".to_string(),
            details: "1行目\n2行目".to_string(),
        };
        let analysis = ConsultantAnalysis {
            profitability: section.clone(),
            safety: section.clone(),
            growth: section,
            overall_summary: overall_summary.to_string(),
            business_challenges: vec![],
            recommendations: vec![
                InsuranceRecommendation {
                    product_name: "工事の保険".to_string(),
                    reasoning: "r".to_string(),
                    sales_talk: "s".to_string(),
                },
                InsuranceRecommendation {
                    product_name: "ビジサポ（統合賠償責任保険）".to_string(),
                    reasoning: "r".to_string(),
                    sales_talk: "s".to_string(),
                },
            ],
        };
        let input = FinancialInput {
            company_name: company_name.to_string(),
            ..Default::default()
        };
        build_deck(
            &analysis,
            &input,
            chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        )
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn package_contains_every_part() {
        let bytes = write_pptx(&deck()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide5.xml",
            "ppt/slides/_rels/slide5.xml.rels",
        ] {
            assert!(names.contains(&part), "missing {part}");
        }
        assert!(!names.contains(&"ppt/slides/slide6.xml"));
    }

    #[test]
    fn presentation_lists_slides_and_theme() {
        let bytes = write_pptx(&deck()).unwrap();

        let presentation = read_entry(&bytes, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 5);
        assert!(presentation.contains("<p:sldSz cx=\"12191695\" cy=\"6858000\"/>"));

        let rels = read_entry(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains("Id=\"rId6\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide5.xml\""));
        assert!(rels.contains("Id=\"rId7\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme\""));

        let types = read_entry(&bytes, "[Content_Types].xml");
        assert_eq!(types.matches("presentationml.slide+xml").count(), 5);
    }

    #[test]
    fn slide_text_is_escaped_and_split_into_paragraphs() {
        let bytes = write_pptx(&deck()).unwrap();
        let summary = read_entry(&bytes, "ppt/slides/slide2.xml");

        assert!(summary.contains("R&amp;D &lt;投資&gt; を継続"));
        assert!(summary.contains("<a:t>1行目</a:t></a:r></a:p><a:p>"));
        assert!(summary.contains("<a:t>2行目</a:t>"));

        let rec = read_entry(&bytes, "ppt/slides/slide4.xml");
        assert!(rec.contains("ご提案: ビジサポ（統合賠償責任保険）"));
        assert!(rec.contains("prst=\"ellipse\""));
    }

    #[test]
    fn control_characters_never_reach_the_package() {
        let bytes = write_pptx(&deck_with(
            "株式会社\u{7}テスト",
            "ctrl\u{1}char\u{FFFF} end",
        ))
        .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let name = entry.name().to_string();
            let mut xml = String::new();
            entry.read_to_string(&mut xml).unwrap();

            assert!(
                xml.chars().all(is_xml_char),
                "{name} carries a character XML forbids"
            );

            let mut reader = quick_xml::Reader::from_str(&xml);
            loop {
                match reader.read_event() {
                    Ok(quick_xml::events::Event::Eof) => break,
                    Ok(_) => {}
                    Err(e) => panic!("{name} is not well-formed: {e}"),
                }
            }
        }

        assert!(read_entry(&bytes, "ppt/slides/slide2.xml").contains("<a:t>ctrlchar end</a:t>"));
        assert!(read_entry(&bytes, "ppt/slides/slide1.xml").contains("株式会社テスト 御中"));
        assert!(read_entry(&bytes, "docProps/core.xml").contains("株式会社テスト様"));
    }

    #[test]
    fn xml_char_filter_keeps_whitespace_and_text() {
        assert_eq!(esc("a\tb\r\nc\u{0}d\u{1F}e"), "a\tb\r\ncde");
        assert_eq!(esc("日本語 & <tag>"), "日本語 &amp; &lt;tag&gt;");
    }
}

//! PPTX generation from slide data.
//!
//! The writer emits a self-contained package: one theme, one master and two
//! layouts (Title Slide, Title and Content), followed by the slides.

use crate::constants::*;
use crate::deck::Deck;
use crate::error::{PptxError, Result};
use crate::slide::{BoxContent, ListContent, ListItem, Slide, SlideContent, TableContent, TextRun};
use crate::slide_contract::SlideContract;
use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use quick_xml::escape::escape;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Left/right margin of the body region in EMU
const BODY_MARGIN_X: i64 = 457_200;

/// Top of the body region in EMU
const BODY_TOP: i64 = 1_600_200;

/// Space kept free under the body region in EMU
const BODY_BOTTOM_GAP: i64 = 731_837;

/// PPTX document writer
pub struct PptxWriter {
    /// Slide contract for layouts, fonts and colors
    contract: SlideContract,

    /// Slides to render
    slides: Vec<Slide>,

    /// Presentation title
    title: Option<String>,

    /// Presentation author
    author: Option<String>,

    /// Fixed creation time; `Utc::now()` when unset
    timestamp: Option<DateTime<Utc>>,
}

/// Hyperlink targets collected while rendering one slide
#[derive(Default)]
struct SlideRels {
    links: Vec<String>,
}

impl SlideRels {
    /// Relationship id for a hyperlink target (rId1 is the layout)
    fn link_id(&mut self, url: &str) -> String {
        let position = match self.links.iter().position(|l| l == url) {
            Some(position) => position,
            None => {
                self.links.push(url.to_string());
                self.links.len() - 1
            }
        };
        format!("rId{}", position + 2)
    }
}

/// A placed rectangle in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new(SlideContract::default())
    }
}

impl PptxWriter {
    /// Create a new PPTX writer with a contract
    pub fn new(contract: SlideContract) -> Self {
        Self {
            contract,
            slides: Vec::new(),
            title: None,
            author: None,
            timestamp: None,
        }
    }

    /// Create a writer holding every slide and property of a deck
    pub fn from_deck(contract: SlideContract, deck: &Deck) -> Self {
        let mut writer = Self::new(contract);
        writer.title = deck.title.clone();
        writer.author = deck.author.clone();
        writer.add_slides(deck.slides.iter().cloned());
        writer
    }

    /// Set the presentation title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Pin the creation time so repeated runs produce identical bytes
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a slide
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Add multiple slides
    pub fn add_slides(&mut self, slides: impl IntoIterator<Item = Slide>) {
        self.slides.extend(slides);
    }

    /// Number of slides queued
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Generate the PPTX and write it to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.generate()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Generate the PPTX as bytes
    pub fn generate(&self) -> Result<Vec<u8>> {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);

        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(&timestamp));

        self.write_content_types(&mut zip, options)?;
        self.write_root_rels(&mut zip, options)?;
        self.write_app_xml(&mut zip, options)?;
        self.write_core_xml(&mut zip, options, &timestamp)?;
        self.write_presentation_xml(&mut zip, options)?;
        self.write_presentation_rels(&mut zip, options)?;
        self.write_pres_props(&mut zip, options)?;
        self.write_table_styles(&mut zip, options)?;
        self.write_view_props(&mut zip, options)?;
        self.write_theme(&mut zip, options)?;
        self.write_slide_master(&mut zip, options)?;
        self.write_slide_layouts(&mut zip, options)?;

        for (i, slide) in self.slides.iter().enumerate() {
            self.write_slide(&mut zip, options, i + 1, slide)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Write [Content_Types].xml
    fn write_content_types<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>
  <Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>
  <Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );

        for i in 1..=self.slides.len() {
            content.push_str(&format!(
                "  <Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n",
                i
            ));
        }

        content.push_str("</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write _rels/.rels
    fn write_root_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/app.xml
    fn write_app_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("docProps/app.xml", options)?;

        let format_name = if self.contract.meta.widescreen {
            "Widescreen"
        } else {
            "On-screen Show (4:3)"
        };

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Application>{}</Application>
  <PresentationFormat>{}</PresentationFormat>
  <Slides>{}</Slides>
  <Notes>0</Notes>
  <HiddenSlides>0</HiddenSlides>
  <ScaleCrop>false</ScaleCrop>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
  <AppVersion>1.0</AppVersion>
</Properties>"#,
            escape_xml(&self.contract.meta.application),
            format_name,
            self.slides.len()
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/core.xml
    fn write_core_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        timestamp: &DateTime<Utc>,
    ) -> Result<()> {
        zip.start_file("docProps/core.xml", options)?;

        let title = self.title.as_deref().unwrap_or(&self.contract.meta.name);
        let author = self
            .author
            .as_deref()
            .unwrap_or(&self.contract.meta.application);
        let now = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>{}</dc:creator>
  <cp:lastModifiedBy>{}</cp:lastModifiedBy>
  <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
</cp:coreProperties>"#,
            escape_xml(title),
            escape_xml(author),
            escape_xml(author),
            now,
            now
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/presentation.xml
    fn write_presentation_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/presentation.xml", options)?;

        let slide_size = self.contract.slide_size();

        let mut slide_refs = String::new();
        for i in 1..=self.slides.len() {
            slide_refs.push_str(&format!(
                "    <p:sldId id=\"{}\" r:id=\"rId{}\"/>\n",
                255 + i,
                i + 3 // rId1=slideMaster, rId2=presProps, rId3=theme, rId4+=slides
            ));
        }

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldIdLst>
{}  </p:sldIdLst>
  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            slide_refs,
            slide_size.0,
            slide_size.1,
            slide_size.1,
            slide_size.0
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/_rels/presentation.xml.rels
    fn write_presentation_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;

        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps" Target="presProps.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
"#,
        );

        for i in 1..=self.slides.len() {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"slides/slide{}.xml\"/>\n",
                i + 3,
                REL_TYPE_SLIDE,
                i
            ));
        }

        rels.push_str("</Relationships>");

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Write ppt/presProps.xml
    fn write_pres_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/presProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:extLst/>
</p:presentationPr>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/tableStyles.xml
    fn write_table_styles<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/tableStyles.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
            NS_DRAWING
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/viewProps.xml
    fn write_view_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/viewProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
</p:viewPr>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/theme/theme1.xml
    fn write_theme<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/theme/theme1.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="{}" name="{}">
  <a:themeElements>
    <a:clrScheme name="Portal">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="{}"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="{}"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Portal">
      <a:majorFont>
        <a:latin typeface="{}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
            NS_DRAWING,
            escape_xml(&self.contract.meta.name),
            self.contract.branding.fill_color,
            self.contract.table.header_background,
            escape_xml(&self.contract.fonts.heading),
            escape_xml(&self.contract.fonts.body)
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/slideMasters/slideMaster1.xml
    fn write_slide_master<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001">
        <a:schemeClr val="bg1"/>
      </p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="2147483649" r:id="rId1"/>
    <p:sldLayoutId id="2147483650" r:id="rId2"/>
  </p:sldLayoutIdLst>
</p:sldMaster>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;

        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;

        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="{}" Target="../slideLayouts/slideLayout2.xml"/>
  <Relationship Id="rId3" Type="{}" Target="../theme/theme1.xml"/>
</Relationships>"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_LAYOUT, REL_TYPE_SLIDE_LAYOUT, REL_TYPE_THEME
        );

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Write ppt/slideLayouts/slideLayoutN.xml
    fn write_slide_layouts<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        let (title, subtitle) = self.title_slide_frames();
        let heading = self.heading_frame();
        let body = self.body_frame();

        // Layout 1: Title Slide
        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="title" preserve="1">
  <p:cSld name="Title Slide">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            layout_placeholder(2, "Title 1", r#"type="ctrTitle""#, title),
            layout_placeholder(3, "Subtitle 2", r#"type="subTitle" idx="1""#, subtitle)
        );

        zip.write_all(content.as_bytes())?;

        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_MASTER
        );
        zip.write_all(rels.as_bytes())?;

        // Layout 2: Title and Content
        zip.start_file("ppt/slideLayouts/slideLayout2.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="obj" preserve="1">
  <p:cSld name="Title and Content">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            layout_placeholder(2, "Title 1", r#"type="title""#, heading),
            layout_placeholder(3, "Content Placeholder 2", r#"idx="1""#, body)
        );

        zip.write_all(content.as_bytes())?;

        zip.start_file("ppt/slideLayouts/_rels/slideLayout2.xml.rels", options)?;
        zip.write_all(rels.as_bytes())?;

        Ok(())
    }

    /// Write a single slide
    fn write_slide<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_num: usize,
        slide: &Slide,
    ) -> Result<()> {
        let layout_idx = self.contract.layout_for_hint(slide.layout_hint);

        let mut slide_rels = SlideRels::default();
        let content = self.generate_slide_xml(slide, &mut slide_rels)?;

        zip.start_file(format!("ppt/slides/slide{}.xml", slide_num), options)?;
        zip.write_all(content.as_bytes())?;

        zip.start_file(
            format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            options,
        )?;

        let mut rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout{}.xml"/>
"#,
            NS_PACKAGE_RELATIONSHIPS, REL_TYPE_SLIDE_LAYOUT, layout_idx
        );

        for (i, url) in slide_rels.links.iter().enumerate() {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\" TargetMode=\"External\"/>\n",
                i + 2,
                REL_TYPE_HYPERLINK,
                escape_xml(url)
            ));
        }

        rels.push_str("</Relationships>");

        zip.write_all(rels.as_bytes())?;
        Ok(())
    }

    /// Generate slide XML content
    fn generate_slide_xml(&self, slide: &Slide, rels: &mut SlideRels) -> Result<String> {
        let mut shapes = String::new();

        if let Some(title) = &slide.title {
            shapes.push_str(&self.generate_title_shape(title, slide.is_title_slide()));
        }

        if slide.is_title_slide() {
            if let Some(subtitle) = &slide.subtitle {
                shapes.push_str(&self.generate_subtitle_shape(subtitle));
            }
        }

        if !slide.content.is_empty() {
            shapes.push_str(&self.generate_content_shapes(&slide.content, rels)?);
        }

        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, shapes
        );

        Ok(xml)
    }

    /// Generate title shape XML
    fn generate_title_shape(&self, title: &str, is_title_slide: bool) -> String {
        let (ph_type, size) = if is_title_slide {
            ("ctrTitle", self.contract.fonts.title_size)
        } else {
            ("title", self.contract.fonts.heading_size)
        };

        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Title 1"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="{}"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr/>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p>
            <a:r>
              <a:rPr lang="{}" sz="{}" b="1"><a:latin typeface="{}"/></a:rPr>
              <a:t>{}</a:t>
            </a:r>
          </a:p>
        </p:txBody>
      </p:sp>
"#,
            ph_type,
            self.contract.meta.locale,
            size * 100,
            escape_xml(&self.contract.fonts.heading),
            escape_xml(title)
        )
    }

    /// Generate subtitle shape XML
    fn generate_subtitle_shape(&self, subtitle: &str) -> String {
        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Subtitle 2"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr/>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p>
            <a:pPr algn="ctr"><a:buNone/></a:pPr>
            <a:r>
              <a:rPr lang="{}" sz="{}"><a:latin typeface="{}"/></a:rPr>
              <a:t>{}</a:t>
            </a:r>
          </a:p>
        </p:txBody>
      </p:sp>
"#,
            self.contract.meta.locale,
            self.contract.fonts.heading_size * 100,
            escape_xml(&self.contract.fonts.body),
            escape_xml(subtitle)
        )
    }

    /// Generate content shapes from SlideContent
    fn generate_content_shapes(&self, content: &[SlideContent], rels: &mut SlideRels) -> Result<String> {
        let mut shapes = String::new();
        let mut shape_id = 4; // After title and subtitle

        for item in content {
            match item {
                SlideContent::BulletList(list) => {
                    shapes.push_str(&self.generate_list_shape(shape_id, list, false, rels));
                }
                SlideContent::NumberedList(list) => {
                    shapes.push_str(&self.generate_list_shape(shape_id, list, true, rels));
                }
                SlideContent::Table(table) => {
                    shapes.push_str(&self.generate_table_frame(shape_id, table)?);
                }
                SlideContent::Box(content) => {
                    shapes.push_str(&self.generate_box_shape(shape_id, content, rels)?);
                }
            }
            shape_id += 1;
        }

        Ok(shapes)
    }

    /// Generate a bullet or numbered list shape
    fn generate_list_shape(&self, id: u32, list: &ListContent, numbered: bool, rels: &mut SlideRels) -> String {
        let mut paragraphs = String::new();

        for item in &list.items {
            paragraphs.push_str(&self.generate_list_item_paragraph(item, numbered, rels));
        }

        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="Content {}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph idx="1"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr/>
        <p:txBody>
          <a:bodyPr><a:normAutofit/></a:bodyPr>
          <a:lstStyle/>
{}        </p:txBody>
      </p:sp>
"#,
            id, id, paragraphs
        )
    }

    /// Generate a list item as a paragraph
    fn generate_list_item_paragraph(&self, item: &ListItem, numbered: bool, rels: &mut SlideRels) -> String {
        let indent = 342_900;
        let margin = indent * (i64::from(item.level) + 1);
        let bullet = if numbered {
            r#"<a:buFont typeface="+mj-lt"/><a:buAutoNum type="arabicPeriod"/>"#
        } else {
            r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#
        };

        format!(
            r#"          <a:p>
            <a:pPr marL="{}" lvl="{}" indent="-{}"><a:spcAft><a:spcPts val="600"/></a:spcAft>{}</a:pPr>
{}          </a:p>
"#,
            margin,
            item.level,
            indent,
            bullet,
            self.generate_text_runs(&item.content.runs, self.body_run_style(), rels)
        )
    }

    /// Generate a table graphic frame in the body region
    fn generate_table_frame(&self, id: u32, table: &TableContent) -> Result<String> {
        let columns = table.column_count();
        for (i, row) in table.rows.iter().enumerate() {
            if row.len() != columns {
                return Err(PptxError::RaggedTable {
                    row: i + 1,
                    found: row.len(),
                    expected: columns,
                });
            }
        }

        let style = &self.contract.table;
        let body = self.body_frame();
        let widths = column_widths(body.cx, columns, &table.col_widths);
        let row_count = i64::try_from(table.row_count()).unwrap_or(i64::MAX);
        let height = style.row_height.saturating_mul(row_count);

        let mut grid = String::new();
        for width in &widths {
            grid.push_str(&format!("            <a:gridCol w=\"{}\"/>\n", width));
        }

        let mut rows = String::new();
        if !table.header.is_empty() {
            let cell_style = RunStyle {
                size: style.font_size,
                bold: true,
                italic: false,
                color: Some(&style.header_text_color),
                font: &self.contract.fonts.body,
            };
            rows.push_str(&self.generate_table_row(&table.header, &style.header_background, cell_style));
        }
        for (i, row) in table.rows.iter().enumerate() {
            let fill = if i % 2 == 0 {
                &style.row_background
            } else {
                &style.alt_row_background
            };
            let cell_style = RunStyle {
                size: style.font_size,
                bold: false,
                italic: false,
                color: None,
                font: &self.contract.fonts.body,
            };
            rows.push_str(&self.generate_table_row(row, fill, cell_style));
        }

        Ok(format!(
            r#"      <p:graphicFrame>
        <p:nvGraphicFramePr>
          <p:cNvPr id="{}" name="Table {}"/>
          <p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>
          <p:nvPr/>
        </p:nvGraphicFramePr>
        <p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>
        <a:graphic>
          <a:graphicData uri="{}">
            <a:tbl>
            <a:tblPr firstRow="1" bandRow="1"/>
            <a:tblGrid>
{}            </a:tblGrid>
{}            </a:tbl>
          </a:graphicData>
        </a:graphic>
      </p:graphicFrame>
"#,
            id, id, body.x, body.y, body.cx, height, NS_TABLE, grid, rows
        ))
    }

    /// Generate one table row
    fn generate_table_row(&self, cells: &[String], fill: &str, style: RunStyle<'_>) -> String {
        let mut row = format!("            <a:tr h=\"{}\">\n", self.contract.table.row_height);

        for cell in cells {
            row.push_str(&format!(
                "              <a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r>{}<a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill></a:tcPr></a:tc>\n",
                self.run_properties(style, None),
                escape_xml(cell),
                fill
            ));
        }

        row.push_str("            </a:tr>\n");
        row
    }

    /// Generate a filled rectangle with centered text
    fn generate_box_shape(&self, id: u32, content: &BoxContent, rels: &mut SlideRels) -> Result<String> {
        let branding = &self.contract.branding;
        let fill = content.fill.as_deref().unwrap_or(&branding.fill_color);
        if !crate::slide_contract::is_hex_color(fill) {
            return Err(PptxError::invalid_color("box fill", fill));
        }

        let style = RunStyle {
            size: branding.font_size,
            bold: false,
            italic: false,
            color: Some(&branding.text_color),
            font: &self.contract.fonts.heading,
        };

        Ok(format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="Box {}"/>
          <p:cNvSpPr/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
          <a:solidFill><a:srgbClr val="{}"/></a:solidFill>
          <a:ln><a:noFill/></a:ln>
        </p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" anchor="ctr"/>
          <a:lstStyle/>
          <a:p>
            <a:pPr algn="ctr"/>
{}          </a:p>
        </p:txBody>
      </p:sp>
"#,
            id,
            id,
            content.position.0,
            content.position.1,
            content.size.0,
            content.size.1,
            fill,
            self.generate_text_runs(&content.text.runs, style, rels)
        ))
    }

    /// Generate text runs
    fn generate_text_runs(&self, runs: &[TextRun], base: RunStyle<'_>, rels: &mut SlideRels) -> String {
        let mut result = String::new();

        for run in runs {
            let style = RunStyle {
                bold: base.bold || run.bold,
                italic: base.italic || run.italic,
                ..base
            };
            let link = run.link.as_deref().map(|url| rels.link_id(url));
            let rpr = self.run_properties(style, link.as_deref());

            result.push_str(&format!(
                "            <a:r>\n              {}\n              <a:t>{}</a:t>\n            </a:r>\n",
                rpr,
                escape_xml(&run.text)
            ));
        }

        result
    }

    /// Build an `a:rPr` element
    fn run_properties(&self, style: RunStyle<'_>, link_id: Option<&str>) -> String {
        let mut rpr = format!("<a:rPr lang=\"{}\" sz=\"{}\"", self.contract.meta.locale, style.size * 100);
        if style.bold {
            rpr.push_str(" b=\"1\"");
        }
        if style.italic {
            rpr.push_str(" i=\"1\"");
        }
        rpr.push('>');
        if let Some(color) = style.color {
            rpr.push_str(&format!("<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>", color));
        }
        rpr.push_str(&format!("<a:latin typeface=\"{}\"/>", escape_xml(style.font)));
        if let Some(id) = link_id {
            rpr.push_str(&format!("<a:hlinkClick r:id=\"{}\"/>", id));
        }
        rpr.push_str("</a:rPr>");
        rpr
    }

    fn body_run_style(&self) -> RunStyle<'_> {
        RunStyle {
            size: self.contract.fonts.body_size,
            bold: false,
            italic: false,
            color: None,
            font: &self.contract.fonts.body,
        }
    }

    /// Title placeholder region on content slides
    fn heading_frame(&self) -> Frame {
        let (width, _) = self.contract.slide_size();
        Frame {
            x: BODY_MARGIN_X,
            y: 274_638,
            cx: width - 2 * BODY_MARGIN_X,
            cy: 1_143_000,
        }
    }

    /// Body placeholder region on content slides
    fn body_frame(&self) -> Frame {
        let (width, height) = self.contract.slide_size();
        Frame {
            x: BODY_MARGIN_X,
            y: BODY_TOP,
            cx: width - 2 * BODY_MARGIN_X,
            cy: height - BODY_TOP - BODY_BOTTOM_GAP,
        }
    }

    /// Title and subtitle regions on title slides
    fn title_slide_frames(&self) -> (Frame, Frame) {
        let (width, _) = self.contract.slide_size();
        (
            Frame {
                x: width * 3 / 40,
                y: 2_130_425,
                cx: width * 17 / 20,
                cy: 1_470_025,
            },
            Frame {
                x: width * 3 / 20,
                y: 3_886_200,
                cx: width * 7 / 10,
                cy: 1_752_600,
            },
        )
    }
}

/// Character formatting shared by the runs of one shape
#[derive(Clone, Copy)]
struct RunStyle<'a> {
    /// Size in points
    size: u32,
    bold: bool,
    italic: bool,
    color: Option<&'a str>,
    font: &'a str,
}

fn layout_placeholder(id: u32, name: &str, ph: &str, frame: Frame) -> String {
    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="{}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph {}/></p:nvPr>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="{}" y="{}"/>
            <a:ext cx="{}" cy="{}"/>
          </a:xfrm>
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p><a:endParaRPr lang="en-US"/></a:p>
        </p:txBody>
      </p:sp>
"#,
        id, name, ph, frame.x, frame.y, frame.cx, frame.cy
    )
}

/// Split `total` EMU across columns by relative weight; equal split when
/// the weights do not match the column count
fn column_widths(total: i64, columns: usize, weights: &[u32]) -> Vec<i64> {
    if columns == 0 {
        return Vec::new();
    }

    let weights: Vec<i64> = if weights.len() == columns && weights.iter().any(|w| *w > 0) {
        weights.iter().map(|w| i64::from(*w)).collect()
    } else {
        vec![1; columns]
    };
    let sum: i64 = weights.iter().sum();

    let mut widths: Vec<i64> = weights.iter().map(|w| total * w / sum).collect();
    let assigned: i64 = widths.iter().sum();
    if let Some(last) = widths.last_mut() {
        *last += total - assigned;
    }
    widths
}

fn zip_timestamp(timestamp: &DateTime<Utc>) -> zip::DateTime {
    let year = u16::try_from(timestamp.year()).unwrap_or(1980);
    zip::DateTime::from_date_and_time(
        year,
        timestamp.month() as u8,
        timestamp.day() as u8,
        timestamp.hour() as u8,
        timestamp.minute() as u8,
        timestamp.second() as u8,
    )
    .unwrap_or_default()
}

/// Escape XML special characters.
///
/// Characters XML 1.0 cannot carry (C0 controls other than tab, LF and CR)
/// become spaces so record text never breaks a part.
pub(crate) fn escape_xml(s: &str) -> String {
    if s.chars().any(is_forbidden_in_xml) {
        let cleaned: String = s
            .chars()
            .map(|c| if is_forbidden_in_xml(c) { ' ' } else { c })
            .collect();
        escape(&cleaned).into_owned()
    } else {
        escape(s).into_owned()
    }
}

fn is_forbidden_in_xml(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

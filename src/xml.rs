/// Writer for Cobertura XML reports.
///
/// Output structure:
///   <coverage line-rate lines-covered lines-valid ...>
///     <sources><source>...</source></sources>
///     <packages>
///       <package name line-rate ...>
///         <classes>
///           <class name filename line-rate ...>
///             <methods>
///               <method name signature line-rate ...>
///                 <lines><line number hits/></lines>
///               </method>
///             </methods>
///             <lines><line number hits/></lines>
///           </class>
///         </classes>
///       </package>
///     </packages>
///   </coverage>
///
/// Branch rates and complexity are always written as zero. An undefined line
/// rate is written as `NaN`.
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::model::{Class, Line, Method, Package, Report};

const DOCTYPE: &str = r#"coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd""#;

trait WriteXml {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()>;
}

impl<T: WriteXml> WriteXml for [T] {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        for value in self {
            value.write_xml(writer)?;
        }
        Ok(())
    }
}

fn rate(value: f64) -> String {
    value.to_string()
}

impl WriteXml for Report {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        writer
            .create_element("coverage")
            .with_attributes([
                ("line-rate", rate(self.line_rate).as_str()),
                ("branch-rate", "0"),
                ("version", self.version.as_str()),
                ("timestamp", self.timestamp.to_string().as_str()),
                ("lines-covered", self.lines_covered.to_string().as_str()),
                ("lines-valid", self.lines_valid.to_string().as_str()),
                ("branches-covered", "0"),
                ("branches-valid", "0"),
                ("complexity", "0"),
            ])
            .write_inner_content(|w| {
                w.create_element("sources").write_inner_content(|w| {
                    for source in &self.sources {
                        w.create_element("source")
                            .write_text_content(BytesText::new(source))?;
                    }
                    Ok::<(), quick_xml::Error>(())
                })?;
                w.create_element("packages")
                    .write_inner_content(|w| self.packages.write_xml(w))?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

impl WriteXml for Package {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        writer
            .create_element("package")
            .with_attributes([
                ("name", self.name.as_str()),
                ("line-rate", rate(self.line_rate).as_str()),
                ("branch-rate", "0"),
                ("complexity", "0"),
            ])
            .write_inner_content(|w| {
                w.create_element("classes")
                    .write_inner_content(|w| self.classes.write_xml(w))?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

impl WriteXml for Class {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        writer
            .create_element("class")
            .with_attributes([
                ("name", self.name.as_str()),
                ("filename", self.filename.as_str()),
                ("line-rate", rate(self.line_rate).as_str()),
                ("branch-rate", "0"),
                ("complexity", "0"),
            ])
            .write_inner_content(|w| {
                w.create_element("methods")
                    .write_inner_content(|w| self.methods.write_xml(w))?;
                w.create_element("lines").write_inner_content(|w| {
                    for line in self.lines() {
                        line.write_xml(w)?;
                    }
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

impl WriteXml for Method {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        writer
            .create_element("method")
            .with_attributes([
                ("name", self.name.as_str()),
                ("signature", ""),
                ("line-rate", rate(self.line_rate).as_str()),
                ("branch-rate", "0"),
                ("complexity", "0"),
            ])
            .write_inner_content(|w| {
                w.create_element("lines")
                    .write_inner_content(|w| self.lines.as_slice().write_xml(w))?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

impl WriteXml for Line {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        writer
            .create_element("line")
            .with_attributes([
                ("number", self.number.to_string().as_str()),
                ("hits", self.hits.to_string().as_str()),
            ])
            .write_empty()?;
        Ok(())
    }
}

/// Write `report` as a Cobertura XML document, tab-indented.
pub fn write_report<W: Write>(report: &Report, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
    report.write_xml(&mut writer)?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Render `report` as a Cobertura XML string.
pub fn to_string(report: &Report) -> Result<String> {
    let mut data = Vec::new();
    write_report(report, &mut data)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

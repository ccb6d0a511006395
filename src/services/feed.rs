//! RSS feed rendering.
//!
//! Flat RSS 2.0 document over the full catalog, most-recent-first. The
//! URL doubles as the stable item identifier.

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::FeedConfig;
use crate::models::SiteRecord;

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Render the feed for a set of records already ordered most-recent-first.
pub fn render_feed(sites: &[SiteRecord], config: &FeedConfig) -> anyhow::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss_start))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &config.title)?;
    write_text_element(&mut writer, "link", &config.link)?;
    write_text_element(&mut writer, "description", &config.description)?;
    write_text_element(&mut writer, "language", &config.language)?;
    write_text_element(&mut writer, "lastBuildDate", &Utc::now().to_rfc2822())?;

    for site in sites {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &site.title)?;
        write_text_element(&mut writer, "link", &site.url)?;
        write_text_element(
            &mut writer,
            "description",
            &format!(
                "Discovered from {} on {}",
                site.source,
                site.capture_date.format("%Y-%m-%d")
            ),
        )?;

        // The URL is the stable identifier.
        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "false"));
        writer.write_event(Event::Start(guid))?;
        writer.write_event(Event::Text(BytesText::new(&site.url)))?;
        writer.write_event(Event::End(BytesEnd::new("guid")))?;

        write_text_element(&mut writer, "pubDate", &site.capture_date.to_rfc2822())?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

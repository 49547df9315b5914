//! Minimal RSS 2.0 and Atom item extraction

use jiff::{Timestamp, Zoned, tz::TimeZone};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One entry of a feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: Option<Zoned>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Published,
}

impl Field {
    fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" | b"summary" | b"content" | b"encoded" => Some(Self::Description),
            b"pubDate" | b"published" | b"updated" | b"date" => Some(Self::Published),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    description: String,
    published: String,
}

impl ItemBuilder {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            // The first of description/summary/content wins
            Field::Description if !self.description.is_empty() => return,
            Field::Description => &mut self.description,
            Field::Published if !self.published.is_empty() => return,
            Field::Published => &mut self.published,
        };
        target.push_str(text);
    }

    fn build(self) -> FeedItem {
        FeedItem {
            title: self.title.trim().to_owned(),
            link: self.link.trim().to_owned(),
            description: self.description.trim().to_owned(),
            published: parse_date(self.published.trim()),
        }
    }
}

/// Extract `<item>` (RSS) or `<entry>` (Atom) elements
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemBuilder> = None;
    let mut field: Option<Field> = None;
    // Depth below the open item; fields are only read from direct children
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if is_item(name.as_ref()) {
                    current = Some(ItemBuilder::default());
                    depth = 0;
                    continue;
                }

                if let Some(item) = current.as_mut() {
                    depth += 1;
                    field = (depth == 1).then(|| Field::from_element(name.as_ref())).flatten();
                    if field == Some(Field::Link) {
                        push_href(item, e);
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(item) = current.as_mut()
                    && depth == 0
                    && e.local_name().as_ref() == b"link"
                {
                    push_href(item, e);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), |text| text.into_owned());
                    item.push(field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    item.push(field, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(ref e)) => {
                if is_item(e.local_name().as_ref()) {
                    if let Some(item) = current.take() {
                        items.push(item.build());
                    }
                } else if current.is_some() {
                    depth = depth.saturating_sub(1);
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("invalid feed XML at byte {}: {e}", reader.error_position())),
            _ => {}
        }
    }

    Ok(items)
}

fn is_item(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

/// Atom links live in `href`; only the first alternate link is kept
fn push_href(item: &mut ItemBuilder, element: &BytesStart<'_>) {
    if !item.link.is_empty() {
        return;
    }

    let alternate = match element.try_get_attribute("rel") {
        Ok(Some(rel)) => rel.value.as_ref() == b"alternate",
        _ => true,
    };

    if alternate
        && let Ok(Some(href)) = element.try_get_attribute("href")
        && let Ok(value) = href.unescape_value()
    {
        item.link = value.into_owned();
    }
}

/// RFC 2822 (RSS) or RFC 3339 (Atom)
fn parse_date(raw: &str) -> Option<Zoned> {
    if raw.is_empty() {
        return None;
    }

    jiff::fmt::rfc2822::parse(raw)
        .ok()
        .or_else(|| raw.parse::<Zoned>().ok())
        .or_else(|| raw.parse::<Timestamp>().ok().map(|ts| ts.to_zoned(TimeZone::UTC)))
}

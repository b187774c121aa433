// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message segment shapes.
//!
//! Each segment kind is a flat struct with its own fields and its own text
//! rendering. [`Segment`] is the closed internal representation; which raw
//! discriminator maps to which variant is decided once, by the
//! [`SegmentRegistry`](crate::SegmentRegistry).
//!
//! On the wire every segment is a JSON object with a `type` discriminator:
//!
//! ```json
//! {"type": "Plain", "text": "hello"}
//! {"type": "At", "target": 123456}
//! {"type": "Image", "imageId": "{01E9...}.jpg", "url": "https://..."}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::chain::MessageChain;
use crate::resource::{nullable, Nullable, RemoteResource};

/// Structural marker carrying the platform message id and timestamp.
///
/// Only ever valid at index 0 of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub time: i64,
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plain {
    pub text: String,
}

/// Mention of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct At {
    pub target: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub display: Nullable<String>,
}

/// Mention of everyone in the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtAll {}

/// Builtin face/sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    pub face_id: i64,
    pub name: String,
}

/// Picture, referenced by platform id and/or a [`RemoteResource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_id: Nullable<String>,
    #[serde(flatten)]
    pub resource: RemoteResource,
}

impl Image {
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_ref().and_then(|v| v.as_deref())
    }
}

/// Self-destructing picture; same shape as [`Image`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashImage {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_id: Nullable<String>,
    #[serde(flatten)]
    pub resource: RemoteResource,
}

impl FlashImage {
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_ref().and_then(|v| v.as_deref())
    }
}

/// Voice clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub voice_id: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub length: Nullable<i64>,
    #[serde(flatten)]
    pub resource: RemoteResource,
}

impl Voice {
    pub fn voice_id(&self) -> Option<&str> {
        self.voice_id.as_ref().and_then(|v| v.as_deref())
    }
}

/// XML rich card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xml {
    pub xml: String,
}

/// JSON rich card (superseded upstream by [`App`], still accepted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Json {
    pub json: String,
}

/// Mini-app card; `content` is the raw JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub content: String,
}

/// Poke/nudge message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poke {
    pub name: String,
}

impl Poke {
    /// Platform poke type id for the known names.
    pub fn poke_type(&self) -> Option<i32> {
        match self.name.as_str() {
            "ChuoYiChuo" => Some(1),
            "ShowLove" => Some(2),
            "Like" => Some(3),
            "Heartbroken" => Some(4),
            "SixSixSix" => Some(5),
            "FangDaZhao" => Some(6),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct DiceRepr {
    value: i64,
}

/// Dice roll; the face value is always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiceRepr")]
pub struct Dice {
    value: u8,
}

impl Dice {
    /// Build a dice segment, rejecting faces outside `1..=6`.
    pub fn new(value: i64) -> Result<Self, String> {
        if (1..=6).contains(&value) {
            Ok(Dice { value: value as u8 })
        } else {
            Err(format!("dice value must be in 1..=6, got {value}"))
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

impl TryFrom<DiceRepr> for Dice {
    type Error = String;

    fn try_from(repr: DiceRepr) -> Result<Self, Self::Error> {
        Dice::new(repr.value)
    }
}

/// Music share card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicShare {
    pub kind: String,
    pub title: String,
    pub summary: String,
    pub jump_url: String,
    pub picture_url: String,
    pub music_url: String,
    pub brief: String,
}

/// Group file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub id: Nullable<String>,
    pub name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub size: Nullable<i64>,
}

/// Reply quoting an earlier message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: i64,
    pub target_id: i64,
    pub origin: MessageChain,
}

/// One node of a forwarded conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardNode {
    pub sender_id: i64,
    pub time: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sender_name: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub message_chain: Nullable<MessageChain>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub message_id: Nullable<i64>,
}

/// Merged-forward message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forward {
    pub node_list: Vec<ForwardNode>,
}

/// A segment kind registered at runtime rather than compiled in.
///
/// The registry validates the raw fields against the extension's own shape
/// before building this value, then keeps the raw fields so rendering is
/// lossless.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub kind: String,
    pub fields: Map<String, Value>,
    /// Display text; `None` renders as `[mirai:<kind>]`.
    pub text: Option<String>,
}

/// One typed element of a message chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Source(Source),
    Plain(Plain),
    At(At),
    AtAll(AtAll),
    Face(Face),
    Image(Image),
    FlashImage(FlashImage),
    Voice(Voice),
    Xml(Xml),
    Json(Json),
    App(App),
    Poke(Poke),
    Dice(Dice),
    MusicShare(MusicShare),
    File(File),
    Quote(Quote),
    Forward(Forward),
    Extension(Extension),
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment::Plain(Plain { text: text.into() })
    }

    pub fn at(target: i64) -> Self {
        Segment::At(At {
            target,
            display: None,
        })
    }

    pub fn source(id: i64, time: i64) -> Self {
        Segment::Source(Source { id, time })
    }

    /// The wire discriminator of this segment.
    pub fn kind(&self) -> &str {
        match self {
            Segment::Source(_) => Source::KIND,
            Segment::Plain(_) => Plain::KIND,
            Segment::At(_) => At::KIND,
            Segment::AtAll(_) => AtAll::KIND,
            Segment::Face(_) => Face::KIND,
            Segment::Image(_) => Image::KIND,
            Segment::FlashImage(_) => FlashImage::KIND,
            Segment::Voice(_) => Voice::KIND,
            Segment::Xml(_) => Xml::KIND,
            Segment::Json(_) => Json::KIND,
            Segment::App(_) => App::KIND,
            Segment::Poke(_) => Poke::KIND,
            Segment::Dice(_) => Dice::KIND,
            Segment::MusicShare(_) => MusicShare::KIND,
            Segment::File(_) => File::KIND,
            Segment::Quote(_) => Quote::KIND,
            Segment::Forward(_) => Forward::KIND,
            Segment::Extension(ext) => &ext.kind,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Segment::Source(_))
    }
}

/// Wire form of a builtin segment: the discriminator followed by its fields.
#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

fn tagged<S: Serializer, T: Serialize>(
    serializer: S,
    kind: &str,
    body: &T,
) -> Result<S::Ok, S::Error> {
    Tagged { kind, body }.serialize(serializer)
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Segment::Source(s) => tagged(serializer, kind, s),
            Segment::Plain(s) => tagged(serializer, kind, s),
            Segment::At(s) => tagged(serializer, kind, s),
            Segment::AtAll(s) => tagged(serializer, kind, s),
            Segment::Face(s) => tagged(serializer, kind, s),
            Segment::Image(s) => tagged(serializer, kind, s),
            Segment::FlashImage(s) => tagged(serializer, kind, s),
            Segment::Voice(s) => tagged(serializer, kind, s),
            Segment::Xml(s) => tagged(serializer, kind, s),
            Segment::Json(s) => tagged(serializer, kind, s),
            Segment::App(s) => tagged(serializer, kind, s),
            Segment::Poke(s) => tagged(serializer, kind, s),
            Segment::Dice(s) => tagged(serializer, kind, s),
            Segment::MusicShare(s) => tagged(serializer, kind, s),
            Segment::File(s) => tagged(serializer, kind, s),
            Segment::Quote(s) => tagged(serializer, kind, s),
            Segment::Forward(s) => tagged(serializer, kind, s),
            Segment::Extension(ext) => tagged(serializer, kind, &ext.fields),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Source(s) => write!(f, "[source:{}]", s.id),
            Segment::Plain(s) => f.write_str(&s.text),
            Segment::At(s) => write!(f, "[mirai:at:{}]", s.target),
            Segment::AtAll(_) => f.write_str("[mirai:atall]"),
            Segment::Face(s) => write!(f, "[mirai:face:{}]", s.face_id),
            Segment::Image(s) => write_resource_tag(f, "image", s.image_id()),
            Segment::FlashImage(s) => write_resource_tag(f, "flash", s.image_id()),
            Segment::Voice(s) => write_resource_tag(f, "voice", s.voice_id()),
            Segment::Xml(s) => write!(f, "[mirai:xml:{}]", s.xml),
            Segment::Json(s) => write!(f, "[mirai:json:{}]", s.json),
            Segment::App(s) => write!(f, "[mirai:app:{}]", s.content),
            Segment::Poke(s) => match s.poke_type() {
                Some(id) => write!(f, "[mirai:poke:{},{id},-1]", s.name),
                None => write!(f, "[mirai:poke:{}]", s.name),
            },
            Segment::Dice(s) => write!(f, "[mirai:dice:{}]", s.value),
            Segment::MusicShare(s) => write!(
                f,
                "[MusicShare::title='{}',musicUrl='{}']",
                s.title, s.music_url
            ),
            Segment::File(s) => write!(f, "[File::name='{}']", s.name),
            Segment::Quote(s) => write!(f, "[Quote::id={}]", s.id),
            Segment::Forward(s) => write!(f, "[Forward::nodes={}]", s.node_list.len()),
            Segment::Extension(ext) => match &ext.text {
                Some(text) => f.write_str(text),
                None => write!(f, "[mirai:{}]", ext.kind),
            },
        }
    }
}

fn write_resource_tag(f: &mut fmt::Formatter<'_>, tag: &str, id: Option<&str>) -> fmt::Result {
    match id {
        Some(id) => write!(f, "[mirai:{tag}:{id}]"),
        None => write!(f, "[mirai:{tag}]"),
    }
}

/// A compiled-in segment shape that can be pulled back out of a [`Segment`].
///
/// Used by the typed chain queries (`chain.first::<At>()`).
pub trait SegmentKind: Sized {
    /// Wire discriminator.
    const KIND: &'static str;

    /// Borrow the inner value if `segment` is of this kind.
    fn from_segment(segment: &Segment) -> Option<&Self>;
}

macro_rules! segment_kinds {
    ($($ty:ident),* $(,)?) => {
        $(
            impl SegmentKind for $ty {
                const KIND: &'static str = stringify!($ty);

                fn from_segment(segment: &Segment) -> Option<&Self> {
                    match segment {
                        Segment::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Segment {
                fn from(inner: $ty) -> Self {
                    Segment::$ty(inner)
                }
            }
        )*
    };
}

segment_kinds!(
    Source, Plain, At, AtAll, Face, Image, FlashImage, Voice, Xml, Json, App, Poke, Dice,
    MusicShare, File, Quote, Forward,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_puts_discriminator_next_to_fields() {
        let value = serde_json::to_value(Segment::at(5)).unwrap();
        assert_eq!(value, json!({"type": "At", "target": 5}));

        let image = Segment::Image(Image {
            image_id: Some(Some("abc.jpg".into())),
            resource: RemoteResource::from_url("http://x/abc.jpg"),
        });
        assert_eq!(
            serde_json::to_value(image).unwrap(),
            json!({"type": "Image", "imageId": "abc.jpg", "url": "http://x/abc.jpg"})
        );
    }

    #[test]
    fn explicit_nulls_survive_render() {
        let raw = json!({"type": "File", "id": null, "name": "a.txt", "size": null});
        let file: File = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(file.id, Some(None));
        assert_eq!(file.size, Some(None));
        assert_eq!(serde_json::to_value(Segment::File(file)).unwrap(), raw);

        let at: At = serde_json::from_value(json!({"target": 1})).unwrap();
        assert_eq!(at.display, None);
    }

    #[test]
    fn at_all_serializes_to_bare_discriminator() {
        let value = serde_json::to_value(Segment::AtAll(AtAll {})).unwrap();
        assert_eq!(value, json!({"type": "AtAll"}));
    }

    #[test]
    fn renders_reference_placeholders() {
        assert_eq!(Segment::plain("hi").to_string(), "hi");
        assert_eq!(Segment::at(5).to_string(), "[mirai:at:5]");
        assert_eq!(Segment::AtAll(AtAll {}).to_string(), "[mirai:atall]");
        assert_eq!(
            Segment::Face(Face {
                face_id: 14,
                name: "smile".into()
            })
            .to_string(),
            "[mirai:face:14]"
        );
        assert_eq!(
            Segment::Dice(Dice::new(3).unwrap()).to_string(),
            "[mirai:dice:3]"
        );
        assert_eq!(
            Segment::Poke(Poke {
                name: "SixSixSix".into()
            })
            .to_string(),
            "[mirai:poke:SixSixSix,5,-1]"
        );
        assert_eq!(Segment::source(9, 1).to_string(), "[source:9]");
    }

    #[test]
    fn non_text_segments_never_render_empty() {
        let image = Segment::Image(Image::default());
        assert_eq!(image.to_string(), "[mirai:image]");
        let ext = Segment::Extension(Extension {
            kind: "MarketFace".into(),
            fields: Map::new(),
            text: None,
        });
        assert_eq!(ext.to_string(), "[mirai:MarketFace]");
    }

    #[test]
    fn dice_rejects_out_of_range_faces() {
        assert!(Dice::new(0).is_err());
        assert!(Dice::new(7).is_err());
        assert!(serde_json::from_value::<Dice>(json!({"value": 9})).is_err());
        let dice: Dice = serde_json::from_value(json!({"value": 6})).unwrap();
        assert_eq!(dice.value(), 6);
    }

    #[test]
    fn typed_extraction_matches_variant_only() {
        let seg = Segment::at(1);
        assert!(At::from_segment(&seg).is_some());
        assert!(Plain::from_segment(&seg).is_none());
        assert_eq!(seg.kind(), "At");
    }
}

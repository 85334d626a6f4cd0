
//! Contains all meta data attributes that can appear in a part header.
//! Any number of attributes can appear in a header, including custom attributes.

use smallvec::SmallVec;

use crate::io::*;
use crate::meta::sequence_end;
use crate::error::*;
use crate::math::{RoundingMode, Vec2};
use bit_field::BitField;


/// One named and typed entry of a part header, in its encoded position.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {

    /// The name of this attribute. Unique within one part header.
    pub name: Text,

    /// The type name as declared in the file, for example `box2i`.
    /// Corresponds to exactly one variant of `AttributeValue`,
    /// or to `AttributeValue::Unknown` for type names this crate does not know.
    pub kind: Text,

    /// The decoded value of this attribute.
    pub value: AttributeValue,
}

/// Contains one of all possible attribute values.
/// Includes a variant for values of unrecognized type.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {

    /// Channel meta data.
    ChannelList(ChannelList),

    /// Color space definition.
    Chromaticities(Chromaticities),

    /// Compression method of the pixel data of this part.
    Compression(Compression),

    /// This part is an environment map.
    EnvironmentMap(EnvironmentMap),

    /// Film roll information.
    KeyCode(KeyCode),

    /// Order of the pixel data blocks in the file.
    LineOrder(LineOrder),

    /// A 3x3 matrix of floats, stored in row-major order.
    Matrix3x3(Matrix3x3),

    /// A 4x4 matrix of floats, stored in row-major order.
    Matrix4x4(Matrix4x4),

    /// Dimensions of the 8-bit rgba preview of the image.
    /// The preview pixel contents are not retained.
    Preview(Preview),

    /// An integer dividend and divisor.
    Rational(Rational),

    /// List of texts.
    TextVector(Vec<Text>),

    /// How the image is split up into tiles.
    TileDescription(TileDescription),

    /// Timepoint and flags for this frame within a sequence.
    TimeCode(TimeCode),

    /// A string of byte-chars.
    Text(Text),

    /// 64-bit float
    F64(f64),

    /// 32-bit float
    F32(f32),

    /// 32-bit signed integer
    I32(i32),

    /// 2D integer rectangle.
    IntegerBounds(IntegerBounds),

    /// 2D float rectangle.
    FloatRect(FloatRect),

    /// 2D integer vector.
    IntVec2(Vec2<i32>),

    /// 2D float vector.
    FloatVec2(Vec2<f32>),

    /// 3D integer vector.
    IntVec3((i32, i32, i32)),

    /// 3D float vector.
    FloatVec3((f32, f32, f32)),

    /// An attribute of a type this crate does not recognize.
    /// Only the raw type name is retained; the payload bytes are skipped.
    Unknown {

        /// The name of the type this attribute is an instance of.
        kind: Text,
    },
}


/// The raw bytes that make up a string in an exr file.
/// Each `u8` is a single char.
// will mostly be "R", "G", "B" or "scanlineimage"
pub type TextBytes = SmallVec<[u8; 24]>;

/// An integer dividend and divisor, together forming a ratio.
/// The divisor is unsigned and may legally be zero.
pub type Rational = (i32, u32);

/// A float matrix with three rows and three columns.
pub type Matrix3x3 = [f32; 3*3];

/// A float matrix with four rows and four columns.
pub type Matrix4x4 = [f32; 4*4];


/// A byte array with each byte being a char.
/// This is not UTF and must be constructed from a standard string.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd, Default, Hash)]
pub struct Text {
    bytes: TextBytes,
}

/// A rectangular section anywhere in 2D integer space,
/// stored as the minimum and maximum corner exactly as encoded in the file.
/// Both corners are inclusive. The maximum corner of a degenerate
/// rectangle may be smaller than its minimum corner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, Hash)]
pub struct IntegerBounds {

    /// The top left corner of this rectangle, inclusive.
    pub min: Vec2<i32>,

    /// The bottom right corner of this rectangle, inclusive.
    pub max: Vec2<i32>,
}

/// A rectangular section anywhere in 2D float space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRect {

    /// The top left corner location of the rectangle, inclusive.
    pub min: Vec2<f32>,

    /// The bottom right corner location of the rectangle, inclusive.
    pub max: Vec2<f32>,
}

/// A list of channels. Channels are stored in their encoded order,
/// which is alphabetical in well-formed files.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelList {

    /// The channels in this list, in their encoded order.
    pub list: SmallVec<[ChannelDescription; 5]>,
}

/// A single channel in a part.
/// Does not contain the actual pixel data,
/// but instead merely describes it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelDescription {

    /// One of "R", "G", or "B" most of the time.
    pub name: Text,

    /// U32, F16 or F32.
    pub sample_type: SampleType,

    /// Whether the samples of this channel should be
    /// quantized linearly by lossy compression methods.
    pub quantize_linearly: bool,

    /// How many of the samples are skipped compared
    /// to the other channels in this part.
    pub sampling: Vec2<i32>,
}

/// The type of samples in a channel.
#[derive(Clone, Debug, Eq, PartialEq, Copy, Hash)]
pub enum SampleType {

    /// The channel contains 32-bit unsigned int values.
    U32,

    /// The channel contains 16-bit float values.
    F16,

    /// The channel contains 32-bit float values.
    F32,

    /// A sample type this crate does not know, as encoded in the file.
    Other(i32),
}

/// The color space of the pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chromaticities {

    /// "Red" location on the CIE XY chromaticity diagram.
    pub red: Vec2<f32>,

    /// "Green" location on the CIE XY chromaticity diagram.
    pub green: Vec2<f32>,

    /// "Blue" location on the CIE XY chromaticity diagram.
    pub blue: Vec2<f32>,

    /// "White" location on the CIE XY chromaticity diagram.
    pub white: Vec2<f32>,
}

/// Specifies how the pixel data of this part is compressed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Compression {

    /// Store uncompressed values.
    Uncompressed,

    /// Run-length encoding.
    RLE,

    /// Zip compression of individual scan lines.
    ZIP1,

    /// Zip compression of blocks of 16 scan lines.
    ZIP16,

    /// Piz-based wavelet compression.
    PIZ,

    /// Lossy 24-bit float compression.
    PXR24,

    /// Lossy 4-by-4 pixel block compression.
    B44,

    /// Lossy 4-by-4 pixel block compression,
    /// flat fields are compressed more.
    B44A,

    /// Lossy DCT-based compression, in blocks of 32 scan lines.
    DWAA,

    /// Lossy DCT-based compression, in blocks of 256 scan lines.
    DWAB,

    /// A compression method this crate does not know, as encoded in the file.
    Other(u8),
}

/// If this attribute is present, it describes
/// how this texture should be projected onto an environment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EnvironmentMap {

    /// This image is an environment map projected like a world map.
    LatitudeLongitude,

    /// This image contains the six sides of a cube.
    Cube,

    /// A projection this crate does not know, as encoded in the file.
    Other(u8),
}

/// Uniquely identifies a motion picture film frame.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct KeyCode {

    /// Identifies a film manufacturer.
    pub film_manufacturer_code: i32,

    /// Identifies a film type.
    pub film_type: i32,

    /// Specifies the film roll prefix.
    pub film_roll_prefix: i32,

    /// Specifies the film count.
    pub count: i32,

    /// Specifies the perforation offset.
    pub perforation_offset: i32,

    /// Specifies the perforation count of each single frame.
    pub perforations_per_frame: i32,

    /// Specifies the perforation count of each single film.
    pub perforations_per_count: i32,
}

/// In what order the pixel data blocks of a part appear in the file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LineOrder {

    /// The blocks are ordered in ascending rows.
    Increasing,

    /// The blocks are ordered in descending rows.
    Decreasing,

    /// The blocks are not ordered in a specific way inside the file.
    Unspecified,

    /// A line order this crate does not know, as encoded in the file.
    Other(u8),
}

/// The dimensions of a small rgba image that approximates the real image.
/// The preview pixel bytes are not retained when inspecting a header.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Preview {

    /// The dimensions of the preview image.
    pub size: Vec2<u32>,
}

/// Describes how the part is divided into tiles.
/// Specifies the size of each tile in the image
/// and whether this image contains multiple resolution levels.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TileDescription {

    /// The size of each tile.
    /// Stays the same number of pixels across all levels.
    pub tile_size: Vec2<u32>,

    /// Whether to also store smaller versions of the image.
    pub level_mode: LevelMode,

    /// Whether to round up or down when calculating mip/rip level sizes.
    /// Carried in the file for every tiled part,
    /// but only meaningful when `level_mode` is not `Singular`.
    pub rounding_mode: LevelRoundingMode,
}

/// Whether to also store increasingly smaller versions of the original image.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LevelMode {

    /// Only a single level.
    Singular,

    /// Levels with a similar aspect ratio.
    MipMap,

    /// Levels with all possible aspect ratios.
    RipMap,

    /// A level mode this crate does not know, as encoded in the file.
    Other(u8),
}

/// Whether to round up or down when calculating mip/rip level sizes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LevelRoundingMode {

    /// Round down.
    Down,

    /// Round up.
    Up,

    /// A rounding mode this crate does not know, as encoded in the file.
    Other(u8),
}

/// Contains time information for this frame within a sequence.
/// Decoded from the `TV60` bit packing used within binary exr files.
///
/// Satisfies the [SMPTE standard 12M-1999](https://en.wikipedia.org/wiki/SMPTE_timecode).
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub struct TimeCode {

    /// Hours 0 - 23 are valid.
    pub hours: u8,

    /// Minutes 0 - 59 are valid.
    pub minutes: u8,

    /// Seconds 0 - 59 are valid.
    pub seconds: u8,

    /// Frame indices 0 - 29 are valid.
    pub frame: u8,

    /// Whether this is a drop frame.
    pub drop_frame: bool,

    /// Whether this is a color frame.
    pub color_frame: bool,

    /// Field phase.
    pub field_phase: bool,

    /// The three binary group flags.
    pub binary_group_flags: [bool; 3],

    /// The opaque user-defined data word, as encoded in the file.
    pub user_data: u32,
}


impl Text {

    /// Create a `Text` from an `str` reference.
    /// Returns `None` if the string contains chars that do not fit a single byte.
    pub fn new_or_none(string: impl AsRef<str>) -> Option<Self> {
        let vec: Option<TextBytes> = string.as_ref().chars()
            .map(|character| {
                let code = character as u32;
                if code <= u8::MAX as u32 { Some(code as u8) } else { None }
            })
            .collect();

        vec.map(Self::from_bytes_unchecked)
    }

    /// Create a `Text` from a slice of bytes,
    /// without checking any of the bytes.
    pub fn from_slice_unchecked(text: &[u8]) -> Self {
        Self::from_bytes_unchecked(SmallVec::from_slice(text))
    }

    /// Create a `Text` from the specified bytes object,
    /// without checking any of the bytes.
    pub fn from_bytes_unchecked(bytes: TextBytes) -> Self {
        Text { bytes }
    }

    /// The internal ASCII bytes this text is made of.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// The underlying bytes that represent this text.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Iterate over the individual chars in this text, similar to `String::chars()`.
    /// Does not do any heap-allocation but borrows from this instance instead.
    pub fn chars(&self) -> impl '_ + Iterator<Item = char> {
        self.bytes.iter().map(|&byte| byte as char)
    }

    /// Compare this `Text` with a plain `&str`.
    pub fn eq(&self, string: &str) -> bool {
        string.chars().eq(self.chars())
    }

    /// Read a string until the null-terminator is found. Then skips the null-terminator.
    pub fn read_null_terminated(read: &mut impl Read, max_len: usize) -> Result<Self> {
        // null-terminated strings are always at least 1 byte
        let mut bytes = smallvec![ u8::read(read)? ];

        loop {
            match u8::read(read)? {
                0 => break,
                non_terminator => bytes.push(non_terminator),
            }

            if bytes.len() > max_len {
                return Err(Error::invalid("text too long"))
            }
        }

        Ok(Text { bytes })
    }

    /// Read the length of a string and then the contents with that length.
    pub fn read_i32_sized(read: &mut impl Read, max_size: usize) -> Result<Self> {
        let size = i32_to_usize(i32::read(read)?, "text size")?;
        let bytes = u8::read_vec(read, size, 1024, Some(max_size), "text attribute length")?;
        Ok(Text::from_bytes_unchecked(SmallVec::from_vec(bytes)))
    }

    /// Read the contents with the specified byte length.
    pub fn read_sized(read: &mut impl Read, size: usize) -> Result<Self> {
        const SMALL_SIZE: usize = 24;

        // for small strings, read into small vec without heap allocation
        if size <= SMALL_SIZE {
            let mut buffer = [0_u8; SMALL_SIZE];
            let data = &mut buffer[..size];

            read.read_exact(data).map_err(Error::from)?;
            Ok(Text::from_slice_unchecked(data))
        }

        // for large strings, read a dynamic vec of arbitrary size
        else {
            let bytes = u8::read_vec(read, size, 1024, None, "text attribute length")?;
            Ok(Text::from_bytes_unchecked(SmallVec::from_vec(bytes)))
        }
    }

    /// Read as many size-prefixed strings as fit into the specified total byte size.
    /// Allows any text length since this is only used for attribute values,
    /// but not attribute names or attribute type names.
    fn read_vec_of_i32_sized(read: &mut impl Read, total_byte_size: usize) -> Result<Vec<Text>> {
        let mut result = Vec::with_capacity(2);

        // the length of the text vector can be inferred from the attribute size
        let mut processed_bytes = 0;

        while processed_bytes < total_byte_size {
            let text = Text::read_i32_sized(read, total_byte_size)?;
            processed_bytes += ::std::mem::size_of::<i32>(); // size prefix of the text
            processed_bytes += text.bytes.len();
            result.push(text);
        }

        // the expected byte size did not match the actual text byte size
        if processed_bytes != total_byte_size {
            return Err(Error::invalid("text array byte size"))
        }

        Ok(result)
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.eq(other)
    }
}

impl PartialEq<Text> for str {
    fn eq(&self, other: &Text) -> bool {
        other.eq(self)
    }
}

impl<'s> From<&'s str> for Text {

    /// Panics if the string contains chars that do not fit a single byte.
    fn from(string: &'s str) -> Self {
        Self::new_or_none(string).expect("exrinfo::Text contains unsupported characters")
    }
}

impl ::std::fmt::Debug for Text {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(f, "Text(\"{}\")", self)
    }
}

// automatically implements to_string for us
impl ::std::fmt::Display for Text {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        use std::fmt::Write;

        for &byte in self.bytes.iter() {
            f.write_char(byte as char)?;
        }

        Ok(())
    }
}


impl IntegerBounds {

    /// The size of this rectangle, counting both inclusive corners.
    /// Returns `None` for degenerate rectangles where a maximum corner
    /// component lies before the corresponding minimum corner component.
    pub fn size(self) -> Option<Vec2<usize>> {
        if self.max.x() < self.min.x() || self.max.y() < self.min.y() {
            return None;
        }

        // +1 because both corners are inclusive
        let width = self.max.x() as i64 + 1 - self.min.x() as i64;
        let height = self.max.y() as i64 + 1 - self.min.y() as i64;
        Some(Vec2(width as usize, height as usize))
    }

    /// Read the value without validating.
    /// Degenerate corners are preserved exactly as encoded.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_min = i32::read(read)?;
        let y_min = i32::read(read)?;
        let x_max = i32::read(read)?;
        let y_max = i32::read(read)?;

        Ok(IntegerBounds {
            min: Vec2(x_min, y_min),
            max: Vec2(x_max, y_max),
        })
    }
}

impl FloatRect {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_min = f32::read(read)?;
        let y_min = f32::read(read)?;
        let x_max = f32::read(read)?;
        let y_max = f32::read(read)?;

        Ok(FloatRect {
            min: Vec2(x_min, y_min),
            max: Vec2(x_max, y_max),
        })
    }
}

impl SampleType {

    /// Read the value. Unknown sample types are preserved, not rejected.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(match i32::read(read)? {
            0 => SampleType::U32,
            1 => SampleType::F16,
            2 => SampleType::F32,
            other => SampleType::Other(other),
        })
    }
}

impl ChannelDescription {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let name = Text::read_null_terminated(read, 256)?;
        let sample_type = SampleType::read(read)?;

        let is_linear = u8::read(read)? != 0;

        let mut reserved = [0_i8; 3];
        i8::read_slice(read, &mut reserved)?;

        let x_sampling = i32::read(read)?;
        let y_sampling = i32::read(read)?;

        Ok(ChannelDescription {
            name, sample_type,
            quantize_linearly: is_linear,
            sampling: Vec2(x_sampling, y_sampling),
        })
    }
}

impl ChannelList {

    /// Read the value without validating.
    /// Preserves the encoded channel order.
    pub fn read(read: &mut PeekRead<impl Read>) -> Result<Self> {
        let mut channels = SmallVec::new();
        while !sequence_end::has_come(read)? {
            channels.push(ChannelDescription::read(read)?);
        }

        Ok(ChannelList { list: channels })
    }
}

impl Chromaticities {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(Chromaticities {
            red: Vec2(f32::read(read)?, f32::read(read)?),
            green: Vec2(f32::read(read)?, f32::read(read)?),
            blue: Vec2(f32::read(read)?, f32::read(read)?),
            white: Vec2(f32::read(read)?, f32::read(read)?),
        })
    }
}

impl Compression {

    /// Read the value. Unknown compression methods are preserved, not rejected.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        use self::Compression::*;
        Ok(match u8::read(read)? {
            0 => Uncompressed,
            1 => RLE,
            2 => ZIP1,
            3 => ZIP16,
            4 => PIZ,
            5 => PXR24,
            6 => B44,
            7 => B44A,
            8 => DWAA,
            9 => DWAB,
            other => Other(other),
        })
    }

    /// For scan line images, the number of scan lines stored together
    /// as one compressed block. Returns `None` for compression methods
    /// this crate does not know.
    pub fn scan_lines_per_block(self) -> Option<usize> {
        use self::Compression::*;
        match self {
            Uncompressed | RLE   | ZIP1 => Some(1),
            ZIP16 | PXR24               => Some(16),
            PIZ   | B44   | B44A | DWAA => Some(32),
            DWAB                        => Some(256),
            Other(_)                    => None,
        }
    }
}

impl EnvironmentMap {

    /// Read the value. Unknown projections are preserved, not rejected.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        use self::EnvironmentMap::*;
        Ok(match u8::read(read)? {
            0 => LatitudeLongitude,
            1 => Cube,
            other => Other(other),
        })
    }
}

impl KeyCode {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(KeyCode {
            film_manufacturer_code: i32::read(read)?,
            film_type: i32::read(read)?,
            film_roll_prefix: i32::read(read)?,
            count: i32::read(read)?,
            perforation_offset: i32::read(read)?,
            perforations_per_frame: i32::read(read)?,
            perforations_per_count: i32::read(read)?,
        })
    }
}

impl LineOrder {

    /// Read the value. Unknown line orders are preserved, not rejected.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        use self::LineOrder::*;
        Ok(match u8::read(read)? {
            0 => Increasing,
            1 => Decreasing,
            2 => Unspecified,
            other => Other(other),
        })
    }
}

impl Preview {

    /// Read the dimensions of the preview.
    /// The pixel bytes that follow in the payload are not decoded.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let width = u32::read(read)?;
        let height = u32::read(read)?;
        Ok(Preview { size: Vec2(width, height) })
    }
}

impl TileDescription {

    /// Read the value. Unknown level and rounding modes are preserved, not rejected.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_size = u32::read(read)?;
        let y_size = u32::read(read)?;

        // mode = level_mode + (rounding_mode * 16)
        let mode = u8::read(read)?;
        let level_mode = mode & 0b0000_1111;
        let rounding_mode = mode >> 4;

        let level_mode = match level_mode {
            0 => LevelMode::Singular,
            1 => LevelMode::MipMap,
            2 => LevelMode::RipMap,
            other => LevelMode::Other(other),
        };

        let rounding_mode = match rounding_mode {
            0 => LevelRoundingMode::Down,
            1 => LevelRoundingMode::Up,
            other => LevelRoundingMode::Other(other),
        };

        Ok(TileDescription { tile_size: Vec2(x_size, y_size), level_mode, rounding_mode })
    }
}

impl LevelRoundingMode {

    /// The rounding mode to use in level size calculations,
    /// or `None` for rounding modes this crate does not know.
    pub fn to_rounding(self) -> Option<RoundingMode> {
        match self {
            LevelRoundingMode::Down => Some(RoundingMode::Down),
            LevelRoundingMode::Up => Some(RoundingMode::Up),
            LevelRoundingMode::Other(_) => None,
        }
    }
}


// assumes the coded value fits into u8
fn u8_from_decimal32(coded: u32) -> u8 {
    ((coded & 0x0f) + 10 * ((coded >> 4) & 0x0f)) as u8
}

// https://github.com/AcademySoftwareFoundation/openexr/blob/master/src/lib/OpenEXR/ImfTimeCode.cpp
impl TimeCode {

    /// Unpack a time code from one TV60 encoded u32 value and the raw user data word.
    /// This is the encoding which is used within a binary exr file.
    pub fn from_tv60_time(tv60_time: u32, user_data: u32) -> Self {
        Self {
            // the casts cannot overflow, as the decoded fields are less than 8 bits
            frame: u8_from_decimal32(tv60_time.get_bits(0..6)),
            drop_frame: tv60_time.get_bit(6),
            color_frame: tv60_time.get_bit(7),
            seconds: u8_from_decimal32(tv60_time.get_bits(8..15)),
            field_phase: tv60_time.get_bit(15),
            minutes: u8_from_decimal32(tv60_time.get_bits(16..23)),
            hours: u8_from_decimal32(tv60_time.get_bits(24..30)),
            binary_group_flags: [
                tv60_time.get_bit(23),
                tv60_time.get_bit(30),
                tv60_time.get_bit(31),
            ],

            user_data,
        }
    }

    /// Read the time code, without validating, extracting from TV60 integers.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let time_and_flags = u32::read(read)?;
        let user_data = u32::read(read)?;
        Ok(Self::from_tv60_time(time_and_flags, user_data))
    }
}


impl Attribute {

    /// Read one attribute: its name, its declared type name, and its value.
    pub fn read(read: &mut PeekRead<impl Read>, max_string_len: usize) -> Result<Self> {
        let name = Text::read_null_terminated(read, max_string_len)?;
        let kind = Text::read_null_terminated(read, max_string_len)?;
        let byte_size = i32_to_usize(i32::read(read)?, "attribute size")?;
        let value = AttributeValue::read(read, &kind, byte_size)?;
        Ok(Attribute { name, kind, value })
    }
}

impl AttributeValue {

    /// Read the value of an attribute with the specified declared type name
    /// and payload byte count. Unrecognized type names are not an error:
    /// the payload is skipped and only the type name is retained.
    pub fn read(read: &mut PeekRead<impl Read>, kind: &Text, byte_size: usize) -> Result<Self> {
        use self::AttributeValue::*;
        use self::type_names as ty;

        if !Self::is_known_kind(kind.as_slice()) {
            skip_bytes(read, byte_size as u64)?;
            return Ok(Unknown { kind: kind.clone() });
        }

        // bound all further parsing by the declared payload size
        let attribute_bytes = u8::read_vec(read, byte_size, 128, None, "attribute value size")?;
        let reader = &mut attribute_bytes.as_slice();

        Ok(match kind.as_slice() {
            ty::I32BOX2 => IntegerBounds(self::IntegerBounds::read(reader)?),
            ty::F32BOX2 => FloatRect(self::FloatRect::read(reader)?),

            ty::I32 => I32(i32::read(reader)?),
            ty::F32 => F32(f32::read(reader)?),
            ty::F64 => F64(f64::read(reader)?),

            ty::RATIONAL => Rational({
                let numerator = i32::read(reader)?;
                let divisor = u32::read(reader)?;
                (numerator, divisor)
            }),

            ty::TIME_CODE => TimeCode(self::TimeCode::read(reader)?),

            ty::I32VEC2 => IntVec2({
                let x = i32::read(reader)?;
                let y = i32::read(reader)?;
                Vec2(x, y)
            }),

            ty::F32VEC2 => FloatVec2({
                let x = f32::read(reader)?;
                let y = f32::read(reader)?;
                Vec2(x, y)
            }),

            ty::I32VEC3 => IntVec3({
                let x = i32::read(reader)?;
                let y = i32::read(reader)?;
                let z = i32::read(reader)?;
                (x, y, z)
            }),

            ty::F32VEC3 => FloatVec3({
                let x = f32::read(reader)?;
                let y = f32::read(reader)?;
                let z = f32::read(reader)?;
                (x, y, z)
            }),

            ty::CHANNEL_LIST    => ChannelList(self::ChannelList::read(&mut PeekRead::new(attribute_bytes.as_slice()))?),
            ty::CHROMATICITIES  => Chromaticities(self::Chromaticities::read(reader)?),
            ty::COMPRESSION     => Compression(self::Compression::read(reader)?),
            ty::ENVIRONMENT_MAP => EnvironmentMap(self::EnvironmentMap::read(reader)?),

            ty::KEY_CODE   => KeyCode(self::KeyCode::read(reader)?),
            ty::LINE_ORDER => LineOrder(self::LineOrder::read(reader)?),

            ty::F32MATRIX3X3 => Matrix3x3({
                let mut result = [0.0_f32; 9];
                f32::read_slice(reader, &mut result)?;
                result
            }),

            ty::F32MATRIX4X4 => Matrix4x4({
                let mut result = [0.0_f32; 16];
                f32::read_slice(reader, &mut result)?;
                result
            }),

            ty::PREVIEW => Preview(self::Preview::read(reader)?),
            ty::TEXT    => Text(self::Text::read_sized(reader, byte_size)?),

            // the number of strings can be inferred from the total attribute size
            ty::TEXT_VECTOR => TextVector(self::Text::read_vec_of_i32_sized(
                &mut attribute_bytes.as_slice(),
                byte_size
            )?),

            ty::TILES => TileDescription(self::TileDescription::read(reader)?),

            _ => unreachable!("checked by is_known_kind"),
        })
    }

    fn is_known_kind(kind: &[u8]) -> bool {
        use self::type_names as ty;
        matches!(
            kind,
            ty::I32BOX2 | ty::F32BOX2 | ty::I32 | ty::F32 | ty::F64
            | ty::RATIONAL | ty::TIME_CODE
            | ty::I32VEC2 | ty::F32VEC2 | ty::I32VEC3 | ty::F32VEC3
            | ty::CHANNEL_LIST | ty::CHROMATICITIES | ty::COMPRESSION
            | ty::ENVIRONMENT_MAP | ty::KEY_CODE | ty::LINE_ORDER
            | ty::F32MATRIX3X3 | ty::F32MATRIX4X4
            | ty::PREVIEW | ty::TEXT | ty::TEXT_VECTOR | ty::TILES
        )
    }
}


/// Contains string literals identifying the type of an attribute.
pub mod type_names {
    macro_rules! define_attribute_type_names {
        ( $($name: ident : $value: expr),* ) => {
            $(
                /// The byte-string name of this attribute type as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_attribute_type_names! {
        I32BOX2:        b"box2i",
        F32BOX2:        b"box2f",
        I32:            b"int",
        F32:            b"float",
        F64:            b"double",
        RATIONAL:       b"rational",
        TIME_CODE:      b"timecode",
        I32VEC2:        b"v2i",
        F32VEC2:        b"v2f",
        I32VEC3:        b"v3i",
        F32VEC3:        b"v3f",
        CHANNEL_LIST:   b"chlist",
        CHROMATICITIES: b"chromaticities",
        COMPRESSION:    b"compression",
        ENVIRONMENT_MAP:b"envmap",
        KEY_CODE:       b"keycode",
        LINE_ORDER:     b"lineOrder",
        F32MATRIX3X3:   b"m33f",
        F32MATRIX4X4:   b"m44f",
        PREVIEW:        b"preview",
        TEXT:           b"string",
        TEXT_VECTOR:    b"stringvector",
        TILES:          b"tiledesc"
    }
}

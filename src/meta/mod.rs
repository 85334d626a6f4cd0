
//! Describes all meta data possible in an exr file.
//! Reads the meta data from a file, without the pixel contents.

pub mod attribute;

use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use smallvec::SmallVec;
use bit_field::BitField;

use crate::io::*;
use crate::error::*;
use crate::math::*;
use self::attribute::*;


/// Everything this crate knows about one exr file:
/// the file-level version field and the complete
/// header of every part, in encoded order.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {

    /// The name the file was opened under, used for reporting.
    pub file_name: String,

    /// The file format version and feature flags of this file.
    pub version: FormatVersion,

    /// The header of each part in this file, in encoded order.
    /// Contains a single header for non-multipart files.
    pub parts: SmallVec<[PartHeader; 3]>,
}

/// The version field at the start of an exr file:
/// a file format version number and the feature flag bits.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FormatVersion {

    /// The file format version number, stored in the low byte of the version field.
    /// Version 2 for all files currently produced by official tooling.
    pub version_number: u8,

    /// The raw feature flag bits of the version field, with the version byte masked out.
    /// Unknown flag bits are carried, not rejected.
    pub flags: u32,

    /// Whether this file consists of a single part which is tiled.
    pub is_single_layer_and_tiled: bool,

    /// Whether attribute names and channel names in this
    /// file may be up to 255 bytes long instead of 31.
    pub has_long_names: bool,

    /// Whether this file contains parts with deep data.
    pub has_deep_data: bool,

    /// Whether this file contains multiple parts.
    pub has_multiple_parts: bool,
}

/// The header of a single part: all its attributes
/// in encoded order, plus whether the pixel data
/// blocks of this part are all present in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct PartHeader {

    /// All attributes of this part, in the order they appear in the file.
    pub attributes: Vec<Attribute>,

    /// Whether the offset table of this part exists and contains no
    /// zeroed entries. A zeroed entry means the corresponding pixel
    /// data block was never written to the file.
    pub complete: bool,
}


/// The first four bytes of each exr file.
pub mod magic_number {
    use super::*;

    /// The first four bytes of each exr file.
    pub const BYTES: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

    /// Without validation, consume this instance, reading the next four bytes from the specified slice.
    pub fn is_exr(read: &mut impl Read) -> Result<bool> {
        let mut magic_num = [0; 4];
        u8::read_slice(read, &mut magic_num)?;
        Ok(magic_num == BYTES)
    }

    /// Validate this image. If it is an exr file, return `Ok(())`.
    pub fn validate_exr(read: &mut impl Read) -> UnitResult {
        if is_exr(read)? {
            Ok(())
        } else {
            Err(Error::invalid("file identifier missing"))
        }
    }
}

/// A `0_u8` at the start of a byte sequence marks its end.
pub mod sequence_end {
    use super::*;

    /// Peek the next byte. If it is zero, consume the byte and return true.
    pub fn has_come(read: &mut PeekRead<impl Read>) -> Result<bool> {
        Ok(read.skip_if_eq(0)?)
    }
}


impl FormatVersion {

    /// Read the version field that follows the magic number.
    /// Decodes the feature flag bits this crate knows about and
    /// carries any remaining flag bits without rejecting them.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let version_and_flags = u32::read(read)?;

        // the 8 least significant bits contain the file format version number
        let version_number = (version_and_flags & 0x00ff) as u8;

        let is_single_tile = version_and_flags.get_bit(9);
        let has_long_names = version_and_flags.get_bit(10);
        let has_deep_data = version_and_flags.get_bit(11);
        let has_multiple_parts = version_and_flags.get_bit(12);

        Ok(FormatVersion {
            version_number,
            flags: version_and_flags & 0xffff_ff00,
            is_single_layer_and_tiled: is_single_tile,
            has_long_names,
            has_deep_data,
            has_multiple_parts,
        })
    }

    /// The longest allowed length of attribute names,
    /// attribute type names, and channel names in this file.
    pub fn max_string_len(&self) -> usize {
        if self.has_long_names { 256 } else { 32 }
    }
}


impl PartHeader {

    /// Read all attributes of one part header, in encoded order,
    /// until the sequence end byte is found.
    pub fn read(read: &mut PeekRead<impl Read>, version: FormatVersion) -> Result<Self> {
        let max_string_len = version.max_string_len();
        let mut attributes = Vec::new();

        while !sequence_end::has_come(read)? {
            attributes.push(Attribute::read(read, max_string_len)?);
        }

        // completeness is determined later, from the offset tables
        Ok(PartHeader { attributes, complete: false })
    }

    /// Find the attribute with the specified name, if present.
    pub fn find(&self, name: &[u8]) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name.as_slice() == name)
    }

    fn find_i32(&self, name: &[u8]) -> Option<i32> {
        match self.find(name)?.value {
            AttributeValue::I32(value) => Some(value),
            _ => None,
        }
    }

    fn find_text(&self, name: &[u8]) -> Option<&Text> {
        match &self.find(name)?.value {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }

    fn find_integer_bounds(&self, name: &[u8]) -> Option<IntegerBounds> {
        match self.find(name)?.value {
            AttributeValue::IntegerBounds(value) => Some(value),
            _ => None,
        }
    }

    fn find_compression(&self) -> Option<Compression> {
        match self.find(b"compression")?.value {
            AttributeValue::Compression(value) => Some(value),
            _ => None,
        }
    }

    fn find_tile_description(&self) -> Option<TileDescription> {
        match self.find(b"tiles")?.value {
            AttributeValue::TileDescription(value) => Some(value),
            _ => None,
        }
    }

    /// The number of pixel data blocks that belong to this part,
    /// which equals the number of entries in its offset table.
    /// Returns `None` when the header does not carry enough
    /// well-formed information to determine the count.
    pub fn chunk_count(&self, version: FormatVersion) -> Option<usize> {

        // multipart and deep files carry the count as an explicit attribute
        if let Some(count) = self.find_i32(b"chunkCount") {
            return usize::try_from(count).ok();
        }

        let part_type = self.find_text(b"type");
        let is_deep = part_type.map_or(false, |kind|
            kind.eq("deepscanline") || kind.eq("deeptile"));

        // for deep parts, the chunk count attribute is required
        if is_deep || version.has_deep_data {
            return None;
        }

        let data_window = self.find_integer_bounds(b"dataWindow")?;
        let data_size = data_window.size()?;

        let is_tiled = version.is_single_layer_and_tiled
            || part_type.map_or(false, |kind| kind.eq("tiledimage"));

        if is_tiled {
            let tiles = self.find_tile_description()?;
            compute_tile_chunk_count(tiles, data_size)
        }
        else {
            let lines_per_block = self.find_compression()?.scan_lines_per_block()?;
            Some(compute_block_count(data_size.height(), lines_per_block))
        }
    }
}


/// Compute the number of chunks that an image is divided into.
pub fn compute_block_count(full_res: usize, tile_size: usize) -> usize {
    // round up, because partial blocks are also blocks
    RoundingMode::Up.divide(full_res, tile_size)
}

/// Compute the number of mip levels, including the full resolution.
pub fn compute_level_count(round: RoundingMode, full_res: usize) -> usize {
    round.log2(full_res) + 1
}

/// Compute the size of a single mip or rip level.
pub fn compute_level_size(round: RoundingMode, full_res: usize, level_index: usize) -> usize {
    debug_assert!(level_index < std::mem::size_of::<usize>() * 8, "largest level size exceeds maximum integer value");
    round.divide(full_res, 1 << level_index).max(1)
}

/// Iterates over all rip map level resolutions of a specific size, including the indices of each level.
/// The order of iteration conforms to the order of the exr file.
pub fn rip_map_levels(round: RoundingMode, max_resolution: Vec2<usize>)
    -> impl Iterator<Item = (Vec2<usize>, Vec2<usize>)>
{
    rip_map_indices(round, max_resolution).map(move |level_indices| {
        // TODO progressively divide instead??
        let width = compute_level_size(round, max_resolution.width(), level_indices.x());
        let height = compute_level_size(round, max_resolution.height(), level_indices.y());
        (level_indices, Vec2(width, height))
    })
}

/// Iterates over all mip map level resolutions of a specific size, including the indices of each level.
/// The order of iteration conforms to the order of the exr file.
pub fn mip_map_levels(round: RoundingMode, max_resolution: Vec2<usize>)
    -> impl Iterator<Item = (usize, Vec2<usize>)>
{
    mip_map_indices(round, max_resolution).map(move |level_index| {
        let width = compute_level_size(round, max_resolution.width(), level_index);
        let height = compute_level_size(round, max_resolution.height(), level_index);
        (level_index, Vec2(width, height))
    })
}

/// Iterates over all rip map level indices of a specific size.
/// The order of iteration conforms to the order of the exr file.
pub fn rip_map_indices(round: RoundingMode, max_resolution: Vec2<usize>)
    -> impl Iterator<Item = Vec2<usize>>
{
    let (width, height) = (
        compute_level_count(round, max_resolution.width()),
        compute_level_count(round, max_resolution.height()),
    );

    (0..height).flat_map(move |y_level| {
        (0..width).map(move |x_level| Vec2(x_level, y_level))
    })
}

/// Iterates over all mip map level indices of a specific size.
/// The order of iteration conforms to the order of the exr file.
pub fn mip_map_indices(round: RoundingMode, max_resolution: Vec2<usize>) -> std::ops::Range<usize> {
    0..compute_level_count(round, max_resolution.width().max(max_resolution.height()))
}

/// Compute the number of chunks that a tiled part is divided into,
/// summed over all of its resolution levels.
/// Returns `None` when the tile description contains values
/// this crate cannot compute level sizes from.
pub fn compute_tile_chunk_count(tiles: TileDescription, data_size: Vec2<usize>) -> Option<usize> {
    let tile_size = tiles.tile_size;
    if tile_size.x() == 0 || tile_size.y() == 0 {
        return None;
    }

    let tile_size = tile_size.map(|size| size as usize);

    let tiles_per_level = move |level_size: Vec2<usize>| {
        compute_block_count(level_size.width(), tile_size.width())
            * compute_block_count(level_size.height(), tile_size.height())
    };

    match tiles.level_mode {
        LevelMode::Singular => Some(tiles_per_level(data_size)),

        LevelMode::MipMap => {
            let round = tiles.rounding_mode.to_rounding()?;
            Some(mip_map_levels(round, data_size)
                .map(|(_, level_size)| tiles_per_level(level_size))
                .sum())
        },

        LevelMode::RipMap => {
            let round = tiles.rounding_mode.to_rounding()?;
            Some(rip_map_levels(round, data_size)
                .map(|(_, level_size)| tiles_per_level(level_size))
                .sum())
        },

        LevelMode::Other(_) => None,
    }
}


impl FileInfo {

    /// Whether the pixel data blocks of every part are all present in the file.
    pub fn is_complete(&self) -> bool {
        self.parts.iter().all(|part| part.complete)
    }
}


/// Read the meta data of the exr file at the specified path.
/// Does not read the pixel contents.
#[must_use]
pub fn read_file_info(path: impl AsRef<Path>) -> Result<FileInfo> {
    let path = path.as_ref();
    let file_name = path.display().to_string();
    read_from_buffered(BufReader::new(File::open(path)?), file_name)
}

/// Read the meta data from the specified reader.
/// Use `read_file_info` instead if you have a file path.
/// This does not buffer the reader, consider wrapping it in a `BufReader` first.
pub fn read_from_buffered(buffered: impl Read, file_name: impl Into<String>) -> Result<FileInfo> {
    let mut read = PeekRead::new(buffered);

    magic_number::validate_exr(&mut read)?;
    let version = FormatVersion::read(&mut read)?;

    let mut parts = if version.has_multiple_parts {
        let mut parts = SmallVec::new();

        // the sequence of part headers is terminated by an empty header
        while !sequence_end::has_come(&mut read)? {
            parts.push(PartHeader::read(&mut read, version)?);
        }

        if parts.is_empty() {
            return Err(Error::invalid("multi part file without any parts"));
        }

        parts
    }
    else {
        smallvec![ PartHeader::read(&mut read, version)? ]
    };

    scan_offset_tables(&mut read, version, &mut parts);

    Ok(FileInfo { file_name: file_name.into(), version, parts })
}

/// Read the offset table of each part and mark the parts whose
/// pixel data blocks are all present in the file. Stops at the
/// first table that cannot be read or whose size cannot be
/// determined, leaving all following parts marked incomplete.
fn scan_offset_tables(read: &mut PeekRead<impl Read>, version: FormatVersion, parts: &mut SmallVec<[PartHeader; 3]>) {
    for part_index in 0..parts.len() {
        let chunk_count = match parts[part_index].chunk_count(version) {
            Some(count) => count,
            None => return,
        };

        let offsets = u64::read_vec(read, chunk_count, u16::MAX as usize, None, "offset table size");
        match offsets {
            // a zeroed entry means the block was never written
            Ok(offsets) => parts[part_index].complete = offsets.iter().all(|&offset| offset != 0),
            Err(_) => return,
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version_field_bits(){
        let word = 2_u32 | (1 << 10) | (1 << 12);
        let version = FormatVersion::read(&mut word.to_le_bytes().as_slice()).unwrap();

        assert_eq!(version.version_number, 2);
        assert_eq!(version.flags, (1 << 10) | (1 << 12));
        assert!(!version.is_single_layer_and_tiled);
        assert!(version.has_long_names);
        assert!(!version.has_deep_data);
        assert!(version.has_multiple_parts);
        assert_eq!(version.max_string_len(), 256);
    }

    #[test]
    fn unknown_version_flags_are_carried(){
        let word = 2_u32 | (1 << 20);
        let version = FormatVersion::read(&mut word.to_le_bytes().as_slice()).unwrap();
        assert_eq!(version.flags, 1 << 20);
    }

    #[test]
    fn rejects_wrong_magic_number(){
        let bytes = [0x76_u8, 0x2f, 0x31, 0x02, 2, 0, 0, 0];
        assert!(read_from_buffered(bytes.as_slice(), "test").is_err());
    }

    fn scanline_part(compression: Compression, data_window: IntegerBounds) -> PartHeader {
        PartHeader {
            attributes: vec![
                Attribute {
                    name: Text::from("compression"),
                    kind: Text::from("compression"),
                    value: AttributeValue::Compression(compression),
                },
                Attribute {
                    name: Text::from("dataWindow"),
                    kind: Text::from("box2i"),
                    value: AttributeValue::IntegerBounds(data_window),
                },
            ],
            complete: false,
        }
    }

    fn single_part_version() -> FormatVersion {
        FormatVersion {
            version_number: 2, flags: 0,
            is_single_layer_and_tiled: false,
            has_long_names: false,
            has_deep_data: false,
            has_multiple_parts: false,
        }
    }

    #[test]
    fn scan_line_chunk_count(){
        let window = IntegerBounds { min: Vec2(0, 0), max: Vec2(63, 99) };

        // 100 lines, 16 lines per block, rounded up
        let part = scanline_part(Compression::ZIP16, window);
        assert_eq!(part.chunk_count(single_part_version()), Some(7));

        // uncompressed blocks hold a single line each
        let part = scanline_part(Compression::Uncompressed, window);
        assert_eq!(part.chunk_count(single_part_version()), Some(100));

        // an unrecognized compression method has no known block size
        let part = scanline_part(Compression::Other(99), window);
        assert_eq!(part.chunk_count(single_part_version()), None);
    }

    #[test]
    fn chunk_count_attribute_wins(){
        let window = IntegerBounds { min: Vec2(0, 0), max: Vec2(63, 99) };
        let mut part = scanline_part(Compression::ZIP16, window);

        part.attributes.push(Attribute {
            name: Text::from("chunkCount"),
            kind: Text::from("int"),
            value: AttributeValue::I32(42),
        });

        assert_eq!(part.chunk_count(single_part_version()), Some(42));
    }

    #[test]
    fn tiled_mip_map_chunk_count(){
        // 64x64 image, 32x32 tiles, mip levels rounded down:
        // level sizes 64, 32, 16, 8, 4, 2, 1 give 4 + 1 + 1 + 1 + 1 + 1 + 1 chunks
        let tiles = TileDescription {
            tile_size: Vec2(32, 32),
            level_mode: LevelMode::MipMap,
            rounding_mode: LevelRoundingMode::Down,
        };

        assert_eq!(compute_tile_chunk_count(tiles, Vec2(64, 64)), Some(10));

        // zero tile sizes cannot be divided by
        let degenerate = TileDescription { tile_size: Vec2(0, 32), ..tiles };
        assert_eq!(compute_tile_chunk_count(degenerate, Vec2(64, 64)), None);
    }

    #[test]
    fn rip_map_chunk_count(){
        // 4x4 image, 2x2 tiles: levels (4,4) (2,4) (1,4) (4,2) ... (1,1)
        let tiles = TileDescription {
            tile_size: Vec2(2, 2),
            level_mode: LevelMode::RipMap,
            rounding_mode: LevelRoundingMode::Down,
        };

        let expected: usize = rip_map_levels(RoundingMode::Down, Vec2(4, 4))
            .map(|(_, Vec2(width, height))|
                compute_block_count(width, 2) * compute_block_count(height, 2))
            .sum();

        // nine levels: (4,4) (2,4) (1,4) (4,2) (2,2) (1,2) (4,1) (2,1) (1,1)
        assert_eq!(compute_tile_chunk_count(tiles, Vec2(4, 4)), Some(expected));
        assert_eq!(expected, 4 + 2 + 2 + 2 + 1 + 1 + 2 + 1 + 1);
    }

    #[test]
    fn degenerate_data_window_has_no_chunks(){
        let window = IntegerBounds { min: Vec2(0, 0), max: Vec2(-1, -1) };
        let part = scanline_part(Compression::ZIP16, window);
        assert_eq!(part.chunk_count(single_part_version()), None);
    }
}

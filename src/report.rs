
//! Renders the meta data of an exr file as a plain text report.
//! The output of `file_report` is deterministic:
//! equal meta data always renders to equal text.

use std::borrow::Cow;
use std::fmt::Write;

use crate::math::Vec2;
use crate::meta::FileInfo;
use crate::meta::attribute::*;


/// The name of a compression method, or its numeric value where this crate does not know a name.
pub fn compression_name(compression: Compression) -> Cow<'static, str> {
    use self::Compression::*;
    match compression {
        Uncompressed => Cow::Borrowed("none"),
        RLE => Cow::Borrowed("run-length encoding"),
        ZIP1 => Cow::Borrowed("zip, individual scanlines"),
        ZIP16 => Cow::Borrowed("zip, multi-scanline blocks"),
        PIZ => Cow::Borrowed("piz"),
        PXR24 => Cow::Borrowed("pxr24"),
        B44 => Cow::Borrowed("b44"),
        B44A => Cow::Borrowed("b44a"),
        DWAA => Cow::Borrowed("dwa, small scanline blocks"),
        DWAB => Cow::Borrowed("dwa, medium scanline blocks"),
        Other(value) => Cow::Owned(value.to_string()),
    }
}

/// The name of a line order, or its numeric value where this crate does not know a name.
pub fn line_order_name(line_order: LineOrder) -> Cow<'static, str> {
    use self::LineOrder::*;
    match line_order {
        Increasing => Cow::Borrowed("increasing y"),
        Decreasing => Cow::Borrowed("decreasing y"),
        Unspecified => Cow::Borrowed("random y"),
        Other(value) => Cow::Owned(value.to_string()),
    }
}

/// The name of a channel sample type, or `type N` where this crate does not know a name.
pub fn sample_type_name(sample_type: SampleType) -> Cow<'static, str> {
    use self::SampleType::*;
    match sample_type {
        U32 => Cow::Borrowed("32-bit unsigned integer"),
        F16 => Cow::Borrowed("16-bit floating-point"),
        F32 => Cow::Borrowed("32-bit floating-point"),
        Other(value) => Cow::Owned(format!("type {}", value)),
    }
}

/// The name of a level mode, or `level mode N` where this crate does not know a name.
pub fn level_mode_name(mode: LevelMode) -> Cow<'static, str> {
    use self::LevelMode::*;
    match mode {
        Singular => Cow::Borrowed("single level"),
        MipMap => Cow::Borrowed("mip-map"),
        RipMap => Cow::Borrowed("rip-map"),
        Other(value) => Cow::Owned(format!("level mode {}", value)),
    }
}

/// The name of a level rounding mode, or `mode N` where this crate does not know a name.
pub fn rounding_mode_name(mode: LevelRoundingMode) -> Cow<'static, str> {
    use self::LevelRoundingMode::*;
    match mode {
        Down => Cow::Borrowed("down"),
        Up => Cow::Borrowed("up"),
        Other(value) => Cow::Owned(format!("mode {}", value)),
    }
}

/// The name of an environment map projection, or `map type N` where this crate does not know a name.
pub fn environment_map_name(map: EnvironmentMap) -> Cow<'static, str> {
    use self::EnvironmentMap::*;
    match map {
        LatitudeLongitude => Cow::Borrowed("latitude-longitude map"),
        Cube => Cow::Borrowed("cube-face map"),
        Other(value) => Cow::Owned(format!("map type {}", value)),
    }
}


// writing to a string never fails, so unwrap the fmt results
fn vec2_f32(Vec2(x, y): Vec2<f32>) -> String {
    format!("{} {}", x, y)
}

fn channel_list_text(channels: &ChannelList) -> String {
    let mut text = String::new();

    for channel in &channels.list {
        write!(
            text, "\n    {}, {}, sampling {} {}",
            channel.name, sample_type_name(channel.sample_type),
            channel.sampling.x(), channel.sampling.y()
        ).unwrap();

        if channel.quantize_linearly {
            text.push_str(", plinear");
        }
    }

    text
}

fn time_code_text(code: &TimeCode) -> String {
    let as_int = |flag: bool| flag as u8;

    format!(
        "    time {:02}:{:02}:{:02}:{:02}\n    \
        drop frame {}, color frame {}, field/phase {}\n    \
        bgf0 {}, bgf1 {}, bgf2 {}\n    \
        user data 0x{:x}",
        code.hours, code.minutes, code.seconds, code.frame,
        as_int(code.drop_frame), as_int(code.color_frame), as_int(code.field_phase),
        as_int(code.binary_group_flags[0]),
        as_int(code.binary_group_flags[1]),
        as_int(code.binary_group_flags[2]),
        code.user_data,
    )
}

fn tile_description_text(tiles: &TileDescription) -> String {
    let mut text = format!(
        ":\n    {}\n    tile size {} by {} pixels",
        level_mode_name(tiles.level_mode),
        tiles.tile_size.x(), tiles.tile_size.y(),
    );

    // the rounding mode only matters when there are multiple levels
    if tiles.level_mode != LevelMode::Singular {
        write!(text, "\n    level sizes rounded {}", rounding_mode_name(tiles.rounding_mode)).unwrap();
    }

    text
}

/// Render the value of one attribute, including the separator that joins
/// it to the `name (type kind)` prefix of its line. Values of unrecognized
/// attribute types render as an empty string, leaving only the prefix.
pub fn format_value(value: &AttributeValue) -> String {
    use self::AttributeValue::*;

    match value {
        IntegerBounds(bounds) => format!(
            ": {} {} - {} {}",
            bounds.min.x(), bounds.min.y(),
            bounds.max.x(), bounds.max.y(),
        ),

        FloatRect(bounds) => format!(
            ": {} {} - {} {}",
            bounds.min.x(), bounds.min.y(),
            bounds.max.x(), bounds.max.y(),
        ),

        ChannelList(channels) => format!(":{}", channel_list_text(channels)),

        Chromaticities(chroma) => format!(
            ":\n    red   {}\n    green {}\n    blue  {}\n    white {}",
            vec2_f32(chroma.red), vec2_f32(chroma.green),
            vec2_f32(chroma.blue), vec2_f32(chroma.white),
        ),

        Compression(compression) => format!(": {}", compression_name(*compression)),
        EnvironmentMap(map) => format!(": {}", environment_map_name(*map)),
        LineOrder(line_order) => format!(": {}", line_order_name(*line_order)),

        KeyCode(code) => format!(
            ":\n    film manufacturer code {}\n    film type code {}\
            \n    prefix {}\n    count {}\n    perf offset {}\
            \n    perfs per frame {}\n    perfs per count {}",
            code.film_manufacturer_code, code.film_type,
            code.film_roll_prefix, code.count, code.perforation_offset,
            code.perforations_per_frame, code.perforations_per_count,
        ),

        Matrix3x3(m) => format!(
            ":\n   ({} {} {}\n    {} {} {}\n    {} {} {})",
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8],
        ),

        Matrix4x4(m) => format!(
            ":\n   ({} {} {} {}\n    {} {} {} {}\n    {} {} {} {}\n    {} {} {} {})",
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7],
            m[8], m[9], m[10], m[11], m[12], m[13], m[14], m[15],
        ),

        Preview(preview) => format!(": {} by {} pixels", preview.size.x(), preview.size.y()),
        Text(text) => format!(": \"{}\"", text),

        TextVector(texts) => {
            let mut result = String::from(":");
            for text in texts {
                write!(result, "\n    \"{}\"", text).unwrap();
            }
            result
        },

        // a zero divisor yields an infinite or NaN decimal, as encoded
        Rational((numerator, divisor)) => format!(
            ": {}/{} ({})",
            numerator, divisor,
            *numerator as f64 / *divisor as f64,
        ),

        TileDescription(tiles) => tile_description_text(tiles),
        TimeCode(code) => format!(":\n{}", time_code_text(code)),

        I32(value) => format!(": {}", value),
        F32(value) => format!(": {}", value),
        F64(value) => format!(": {}", value),

        IntVec2(Vec2(x, y)) => format!(": {} {}", x, y),
        FloatVec2(Vec2(x, y)) => format!(": {} {}", x, y),
        IntVec3((x, y, z)) => format!(": {} {} {}", x, y, z),
        FloatVec3((x, y, z)) => format!(": {} {} {}", x, y, z),

        Unknown { .. } => String::new(),
    }
}


/// Render the complete report for one file: heading, version line,
/// and one line (or block) per attribute of every part, in encoded order.
/// Part headings appear only for files with more than one part.
pub fn file_report(info: &FileInfo) -> String {
    let mut report = String::with_capacity(1024);

    write!(
        report, "\nfile {}{}:\n\n",
        info.file_name,
        if info.is_complete() { "" } else { " (incomplete)" },
    ).unwrap();

    write!(
        report, "file format version: {}, flags 0x{:x}\n",
        info.version.version_number, info.version.flags,
    ).unwrap();

    let single_part = info.parts.len() == 1;

    for (part_index, part) in info.parts.iter().enumerate() {
        if !single_part {
            write!(
                report, "\n\n part {}{}:\n",
                part_index,
                if part.complete { "" } else { " (incomplete)" },
            ).unwrap();
        }

        for attribute in &part.attributes {
            write!(
                report, "{} (type {}){}\n",
                attribute.name, attribute.kind,
                format_value(&attribute.value),
            ).unwrap();
        }
    }

    report.push('\n');
    report
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::{FormatVersion, PartHeader};

    fn attribute(name: &str, kind: &str, value: AttributeValue) -> Attribute {
        Attribute { name: Text::from(name), kind: Text::from(kind), value }
    }

    fn version(flags: u32) -> FormatVersion {
        FormatVersion {
            version_number: 2,
            flags,
            is_single_layer_and_tiled: false,
            has_long_names: false,
            has_deep_data: false,
            has_multiple_parts: flags & (1 << 12) != 0,
        }
    }

    #[test]
    fn known_labels(){
        assert_eq!(compression_name(Compression::Uncompressed), "none");
        assert_eq!(compression_name(Compression::RLE), "run-length encoding");
        assert_eq!(compression_name(Compression::ZIP1), "zip, individual scanlines");
        assert_eq!(compression_name(Compression::ZIP16), "zip, multi-scanline blocks");
        assert_eq!(compression_name(Compression::PIZ), "piz");
        assert_eq!(compression_name(Compression::PXR24), "pxr24");
        assert_eq!(compression_name(Compression::B44), "b44");
        assert_eq!(compression_name(Compression::B44A), "b44a");
        assert_eq!(compression_name(Compression::DWAA), "dwa, small scanline blocks");
        assert_eq!(compression_name(Compression::DWAB), "dwa, medium scanline blocks");

        assert_eq!(line_order_name(LineOrder::Increasing), "increasing y");
        assert_eq!(line_order_name(LineOrder::Decreasing), "decreasing y");
        assert_eq!(line_order_name(LineOrder::Unspecified), "random y");

        assert_eq!(sample_type_name(SampleType::U32), "32-bit unsigned integer");
        assert_eq!(sample_type_name(SampleType::F16), "16-bit floating-point");
        assert_eq!(sample_type_name(SampleType::F32), "32-bit floating-point");

        assert_eq!(level_mode_name(LevelMode::Singular), "single level");
        assert_eq!(level_mode_name(LevelMode::MipMap), "mip-map");
        assert_eq!(level_mode_name(LevelMode::RipMap), "rip-map");

        assert_eq!(rounding_mode_name(LevelRoundingMode::Down), "down");
        assert_eq!(rounding_mode_name(LevelRoundingMode::Up), "up");

        assert_eq!(environment_map_name(EnvironmentMap::LatitudeLongitude), "latitude-longitude map");
        assert_eq!(environment_map_name(EnvironmentMap::Cube), "cube-face map");
    }

    #[test]
    fn unknown_label_fallbacks(){
        assert_eq!(compression_name(Compression::Other(42)), "42");
        assert_eq!(line_order_name(LineOrder::Other(7)), "7");
        assert_eq!(sample_type_name(SampleType::Other(9)), "type 9");
        assert_eq!(level_mode_name(LevelMode::Other(5)), "level mode 5");
        assert_eq!(rounding_mode_name(LevelRoundingMode::Other(3)), "mode 3");
        assert_eq!(environment_map_name(EnvironmentMap::Other(4)), "map type 4");
    }

    #[test]
    fn scalar_and_vector_values(){
        assert_eq!(format_value(&AttributeValue::I32(7)), ": 7");
        assert_eq!(format_value(&AttributeValue::F32(2.5)), ": 2.5");
        assert_eq!(format_value(&AttributeValue::F64(-0.25)), ": -0.25");

        assert_eq!(format_value(&AttributeValue::IntVec2(Vec2(3, -4))), ": 3 -4");
        assert_eq!(format_value(&AttributeValue::FloatVec2(Vec2(0.5, 1.0))), ": 0.5 1");
        assert_eq!(format_value(&AttributeValue::IntVec3((1, 2, 3))), ": 1 2 3");
        assert_eq!(format_value(&AttributeValue::FloatVec3((1.0, 2.0, 3.5))), ": 1 2 3.5");

        assert_eq!(
            format_value(&AttributeValue::Text(Text::from("scanlineimage"))),
            ": \"scanlineimage\"",
        );
    }

    #[test]
    fn box_values_render_as_encoded(){
        let bounds = IntegerBounds { min: Vec2(0, 0), max: Vec2(1023, 767) };
        assert_eq!(format_value(&AttributeValue::IntegerBounds(bounds)), ": 0 0 - 1023 767");

        // degenerate boxes print their encoded corners unchanged
        let degenerate = IntegerBounds { min: Vec2(5, 5), max: Vec2(-5, -5) };
        assert_eq!(format_value(&AttributeValue::IntegerBounds(degenerate)), ": 5 5 - -5 -5");
    }

    #[test]
    fn channel_list_value(){
        let channels = ChannelList {
            list: smallvec![
                ChannelDescription {
                    name: Text::from("A"),
                    sample_type: SampleType::F16,
                    quantize_linearly: true,
                    sampling: Vec2(1, 1),
                },
                ChannelDescription {
                    name: Text::from("Z"),
                    sample_type: SampleType::F32,
                    quantize_linearly: false,
                    sampling: Vec2(2, 2),
                },
            ],
        };

        assert_eq!(
            format_value(&AttributeValue::ChannelList(channels)),
            ":\n    A, 16-bit floating-point, sampling 1 1, plinear\
             \n    Z, 32-bit floating-point, sampling 2 2",
        );
    }

    #[test]
    fn tile_description_value(){
        let single = TileDescription {
            tile_size: Vec2(64, 64),
            level_mode: LevelMode::Singular,
            rounding_mode: LevelRoundingMode::Down,
        };

        // no rounding line for single-level images
        assert_eq!(
            format_value(&AttributeValue::TileDescription(single)),
            ":\n    single level\n    tile size 64 by 64 pixels",
        );

        let mip_mapped = TileDescription {
            tile_size: Vec2(32, 16),
            level_mode: LevelMode::MipMap,
            rounding_mode: LevelRoundingMode::Up,
        };

        assert_eq!(
            format_value(&AttributeValue::TileDescription(mip_mapped)),
            ":\n    mip-map\n    tile size 32 by 16 pixels\n    level sizes rounded up",
        );
    }

    #[test]
    fn time_code_value(){
        let code = TimeCode {
            hours: 1, minutes: 2, seconds: 3, frame: 4,
            drop_frame: true, color_frame: false, field_phase: false,
            binary_group_flags: [false, true, false],
            user_data: 255,
        };

        assert_eq!(
            format_value(&AttributeValue::TimeCode(code)),
            ":\n    time 01:02:03:04\
             \n    drop frame 1, color frame 0, field/phase 0\
             \n    bgf0 0, bgf1 1, bgf2 0\
             \n    user data 0xff",
        );
    }

    #[test]
    fn rational_with_zero_divisor(){
        assert_eq!(format_value(&AttributeValue::Rational((24, 1))), ": 24/1 (24)");
        assert_eq!(format_value(&AttributeValue::Rational((1, 0))), ": 1/0 (inf)");
        assert_eq!(format_value(&AttributeValue::Rational((-1, 0))), ": -1/0 (-inf)");
    }

    #[test]
    fn matrix_values(){
        let identity = [
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ];

        assert_eq!(
            format_value(&AttributeValue::Matrix3x3(identity)),
            ":\n   (1 0 0\n    0 1 0\n    0 0 1)",
        );
    }

    #[test]
    fn four_by_four_matrix_value(){
        let identity = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];

        assert_eq!(
            format_value(&AttributeValue::Matrix4x4(identity)),
            ":\n   (1 0 0 0\n    0 1 0 0\n    0 0 1 0\n    0 0 0 1)",
        );
    }

    #[test]
    fn chromaticities_value(){
        // the label column is padded to equal width
        let chroma = Chromaticities {
            red: Vec2(0.64, 0.33),
            green: Vec2(0.3, 0.6),
            blue: Vec2(0.15, 0.06),
            white: Vec2(0.3127, 0.329),
        };

        assert_eq!(
            format_value(&AttributeValue::Chromaticities(chroma)),
            ":\n    red   0.64 0.33\
             \n    green 0.3 0.6\
             \n    blue  0.15 0.06\
             \n    white 0.3127 0.329",
        );
    }

    #[test]
    fn preview_value(){
        let preview = Preview { size: Vec2(64, 48) };
        assert_eq!(format_value(&AttributeValue::Preview(preview)), ": 64 by 48 pixels");
    }

    #[test]
    fn float_box_value(){
        let bounds = FloatRect { min: Vec2(0.0, -0.5), max: Vec2(0.5, 1.5) };
        assert_eq!(format_value(&AttributeValue::FloatRect(bounds)), ": 0 -0.5 - 0.5 1.5");
    }

    #[test]
    fn keycode_value(){
        let code = KeyCode {
            film_manufacturer_code: 9, film_type: 8, film_roll_prefix: 7,
            count: 6, perforation_offset: 5,
            perforations_per_frame: 4, perforations_per_count: 64,
        };

        assert_eq!(
            format_value(&AttributeValue::KeyCode(code)),
            ":\n    film manufacturer code 9\n    film type code 8\
             \n    prefix 7\n    count 6\n    perf offset 5\
             \n    perfs per frame 4\n    perfs per count 64",
        );
    }

    #[test]
    fn text_vector_value(){
        let texts = vec![ Text::from("left"), Text::from("right") ];
        assert_eq!(
            format_value(&AttributeValue::TextVector(texts)),
            ":\n    \"left\"\n    \"right\"",
        );
    }

    #[test]
    fn unknown_value_renders_nothing(){
        let value = AttributeValue::Unknown { kind: Text::from("customtype") };
        assert_eq!(format_value(&value), "");
    }

    #[test]
    fn single_part_report(){
        let info = FileInfo {
            file_name: "image.exr".to_string(),
            version: version(0),
            parts: smallvec![ PartHeader {
                attributes: vec![
                    attribute("compression", "compression", AttributeValue::Compression(Compression::ZIP16)),
                    attribute(
                        "dataWindow", "box2i",
                        AttributeValue::IntegerBounds(IntegerBounds {
                            min: Vec2(0, 0), max: Vec2(15, 15),
                        }),
                    ),
                    attribute("mystery", "customtype", AttributeValue::Unknown { kind: Text::from("customtype") }),
                ],
                complete: true,
            } ],
        };

        // no part heading for single-part files
        assert_eq!(
            file_report(&info),
            "\nfile image.exr:\n\n\
            file format version: 2, flags 0x0\n\
            compression (type compression): zip, multi-scanline blocks\n\
            dataWindow (type box2i): 0 0 - 15 15\n\
            mystery (type customtype)\n\
            \n",
        );
    }

    #[test]
    fn multi_part_report_marks_incomplete_parts(){
        let part = |name: &str, complete| PartHeader {
            attributes: vec![ attribute("name", "string", AttributeValue::Text(Text::from(name))) ],
            complete,
        };

        let info = FileInfo {
            file_name: "deep.exr".to_string(),
            version: version(1 << 12),
            parts: smallvec![ part("left", true), part("right", false) ],
        };

        assert_eq!(
            file_report(&info),
            "\nfile deep.exr (incomplete):\n\n\
            file format version: 2, flags 0x1000\n\
            \n\n part 0:\n\
            name (type string): \"left\"\n\
            \n\n part 1 (incomplete):\n\
            name (type string): \"right\"\n\
            \n",
        );
    }

    #[test]
    fn report_is_deterministic(){
        let info = FileInfo {
            file_name: "image.exr".to_string(),
            version: version(0),
            parts: smallvec![ PartHeader {
                attributes: vec![
                    attribute("pixelAspectRatio", "float", AttributeValue::F32(1.0)),
                    attribute("screenWindowCenter", "v2f", AttributeValue::FloatVec2(Vec2(0.0, 0.0))),
                ],
                complete: true,
            } ],
        };

        assert_eq!(file_report(&info), file_report(&info));
    }
}

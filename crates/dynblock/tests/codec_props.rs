use dynblock::codec::{self, tags, Buffer, Field, RecordKind, Tag, Variant, WireType};
use dynblock::model::Handle;
use proptest::prelude::*;

fn payload_value() -> impl Strategy<Value = Variant> {
    prop_oneof![
        any::<String>().prop_map(Variant::String),
        any::<i64>().prop_map(Variant::Int),
    ]
}

/// Tags drawn from every region of the vocabulary: declared slots, the gaps
/// between them, the payload range, and host extensions past it.
fn any_tag() -> impl Strategy<Value = Tag> {
    prop_oneof![
        1001..=1012,
        1020..=1069,
        tags::PAYLOAD..tags::PAYLOAD + 64,
        2000..=2100,
    ]
}

/// Raw material for one value; which part is used depends on the slot type.
#[derive(Debug, Clone)]
struct Seed {
    pick: usize,
    text: String,
    int: i64,
    float: f64,
    handle: u64,
}

fn seed() -> impl Strategy<Value = Seed> {
    (
        any::<usize>(),
        ".{0,16}",
        any::<i64>(),
        any::<f64>(),
        any::<u64>(),
    )
        .prop_map(|(pick, text, int, float, handle)| Seed {
            pick,
            text,
            int,
            float,
            handle,
        })
}

const EVERY_TYPE: &[WireType] = &[
    WireType::String,
    WireType::Int,
    WireType::Float,
    WireType::Handle,
];

/// A field valid for `kind`: declared tags get one of their declared types,
/// undeclared tags get any type.
fn conforming_field(kind: RecordKind, tag: Tag, seed: Seed) -> Field {
    let allowed = codec::expected_types(kind, tag).unwrap_or(EVERY_TYPE);
    let value = match allowed[seed.pick % allowed.len()] {
        WireType::String => Variant::String(seed.text),
        WireType::Int => Variant::Int(seed.int),
        WireType::Float => Variant::Float(seed.float),
        WireType::Handle => Variant::Handle(Handle::new(seed.handle)),
    };
    Field { tag, value }
}

proptest! {
    #[test]
    fn conforming_records_of_every_kind_survive_the_wire(
        kind in prop::sample::select(RecordKind::ALL.to_vec()),
        entries in prop::collection::vec((any_tag(), seed()), 0..48),
    ) {
        let fields: Vec<Field> = entries
            .into_iter()
            .map(|(tag, seed)| conforming_field(kind, tag, seed))
            .collect();

        let buffer = codec::encode(kind, &fields).unwrap();
        prop_assert_eq!(codec::peek_kind(&buffer), Ok(kind));
        prop_assert_eq!(codec::decode(kind, &buffer), Ok(fields.clone()));
        prop_assert_eq!(codec::decode_any(&buffer), Ok((kind, fields)));
    }

    #[test]
    fn encode_accepts_exactly_what_decode_accepts(
        kind in prop::sample::select(RecordKind::ALL.to_vec()),
        tag in any_tag(),
        value in prop_oneof![
            ".{0,8}".prop_map(Variant::String),
            any::<i64>().prop_map(Variant::Int),
            any::<f64>().prop_map(Variant::Float),
            any::<u64>().prop_map(|h| Variant::Handle(Handle::new(h))),
        ],
    ) {
        let fields = vec![Field { tag, value }];
        match codec::encode(kind, &fields) {
            Ok(buffer) => prop_assert_eq!(codec::decode(kind, &buffer), Ok(fields)),
            Err(_) => {
                let allowed = codec::expected_types(kind, tag);
                prop_assert!(allowed.is_some());
                prop_assert!(!allowed.unwrap_or(EVERY_TYPE).contains(&fields[0].value.wire_type()));
            }
        }
    }

    #[test]
    fn lookup_table_fields_survive_the_wire(
        name in "[A-Za-z][A-Za-z0-9_ ]{0,20}",
        values in prop::collection::vec(payload_value(), 0..64),
    ) {
        let mut fields = vec![
            Field::new(tags::NAME, name.as_str()),
            Field::new(tags::FLAG_0, 0i64),
            Field::new(tags::FLAG_1, 0i64),
        ];
        fields.extend(
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| Field { tag: tags::payload(i), value }),
        );

        let buffer = codec::encode(RecordKind::LookupTable, &fields).unwrap();
        prop_assert_eq!(codec::peek_kind(&buffer), Ok(RecordKind::LookupTable));
        prop_assert_eq!(codec::decode(RecordKind::LookupTable, &buffer), Ok(fields));
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let buffer = Buffer::from(bytes);
        let _ = codec::decode_any(&buffer);
        let _ = codec::decode(RecordKind::Parameter, &buffer);
    }

    #[test]
    fn truncated_buffers_decode_to_a_prefix_or_fail(cut in 1usize..40) {
        let fields = vec![
            Field::new(tags::NAME, "Width"),
            Field::new(tags::LABEL, "Width"),
            Field::new(tags::FLAG_0, 1i64),
        ];
        let bytes = codec::encode(RecordKind::Parameter, &fields).unwrap().into_vec();
        let cut = cut.min(bytes.len() - 1);
        let truncated = Buffer::from(bytes[..bytes.len() - cut].to_vec());
        // A cut on an entry boundary decodes to a prefix of the fields.
        if let Ok(decoded) = codec::decode(RecordKind::Parameter, &truncated) {
            prop_assert!(decoded.len() < fields.len());
            prop_assert_eq!(&decoded[..], &fields[..decoded.len()]);
        }
    }
}

#[test]
fn wrong_kind_is_rejected() {
    let buffer = codec::encode(RecordKind::Grip, &[]).unwrap();
    assert!(codec::decode(RecordKind::Parameter, &buffer).is_err());
    assert_eq!(codec::decode(RecordKind::Grip, &buffer), Ok(Vec::new()));
}

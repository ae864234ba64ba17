//! Key text for constant literals
//!
//! The declared kind of a constant comes from its result type (enums use
//! their underlying kind). The payload is checked against that kind only
//! where the rendering depends on it; any mismatch there, or a kind with no
//! rendering rule, makes the tree uncacheable.

use plankey_core::{PlanKeyError, PlanKeyResult, PrimitiveTypeKind, TypeUsage};
use plankey_ir::{ConstantValue, SpatialValue};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const DATE_TIME_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";
const TIME_FORMAT: &str = "%H:%M:%S%.9f";

/// Append `literal:identity` for a constant of type `result_type`
pub fn append_constant(
    key: &mut String,
    value: &ConstantValue,
    result_type: &TypeUsage,
) -> PlanKeyResult<()> {
    let Some(kind) = result_type.edm_type.scalar_kind() else {
        return Err(PlanKeyError::unsupported_constant(
            result_type.identity.as_str(),
            "constant is not of a scalar type",
        ));
    };

    let mismatch = || {
        PlanKeyError::unsupported_constant(
            kind.name(),
            format!("payload is a {} value", value.shape_name()),
        )
    };

    match kind {
        PrimitiveTypeKind::Binary => match value {
            ConstantValue::Binary(bytes) => append_binary(key, bytes),
            _ => return Err(mismatch()),
        },
        PrimitiveTypeKind::String => match value {
            ConstantValue::String(s) => append_quoted(key, s),
            _ => return Err(mismatch()),
        },
        PrimitiveTypeKind::Boolean
        | PrimitiveTypeKind::Byte
        | PrimitiveTypeKind::Decimal
        | PrimitiveTypeKind::Double
        | PrimitiveTypeKind::Guid
        | PrimitiveTypeKind::Single
        | PrimitiveTypeKind::SByte
        | PrimitiveTypeKind::Int16
        | PrimitiveTypeKind::Int32
        | PrimitiveTypeKind::Int64
        | PrimitiveTypeKind::Time => match plain_text(value) {
            Some(text) => key.push_str(&text),
            None => return Err(mismatch()),
        },
        PrimitiveTypeKind::DateTime => match value {
            ConstantValue::DateTime(dt) => {
                key.push_str(&dt.format(DATE_TIME_FORMAT).to_string())
            }
            _ => return Err(mismatch()),
        },
        PrimitiveTypeKind::DateTimeOffset => match value {
            ConstantValue::DateTimeOffset(dt) => {
                key.push_str(&dt.format(DATE_TIME_OFFSET_FORMAT).to_string())
            }
            _ => return Err(mismatch()),
        },
        k if k.is_geometry() => match value {
            ConstantValue::Geometry(spatial) => append_spatial(key, spatial),
            _ => return Err(mismatch()),
        },
        k if k.is_geography() => match value {
            ConstantValue::Geography(spatial) => append_spatial(key, spatial),
            _ => return Err(mismatch()),
        },
        other => {
            return Err(PlanKeyError::unsupported_constant(
                other.name(),
                "no canonical text form",
            ));
        }
    }

    key.push(':');
    key.push_str(&result_type.identity);
    Ok(())
}

/// Append `text` in single quotes, doubling embedded quotes
pub fn append_quoted(key: &mut String, text: &str) {
    key.push('\'');
    key.push_str(&text.replace('\'', "''"));
    key.push('\'');
}

fn append_binary(key: &mut String, bytes: &[u8]) {
    key.push('\'');
    for b in bytes {
        key.push_str(&format!("{:02X}", b));
    }
    key.push('\'');
}

fn append_spatial(key: &mut String, spatial: &SpatialValue) {
    key.push_str(&format!("SRID={};{}", spatial.srid, spatial.wkt));
}

/// Locale-independent text of payloads that need no quoting
fn plain_text(value: &ConstantValue) -> Option<String> {
    let text = match value {
        ConstantValue::Boolean(true) => "True".to_string(),
        ConstantValue::Boolean(false) => "False".to_string(),
        ConstantValue::Byte(v) => v.to_string(),
        ConstantValue::SByte(v) => v.to_string(),
        ConstantValue::Int16(v) => v.to_string(),
        ConstantValue::Int32(v) => v.to_string(),
        ConstantValue::Int64(v) => v.to_string(),
        ConstantValue::Single(v) => v.to_string(),
        ConstantValue::Double(v) => v.to_string(),
        ConstantValue::Decimal(v) => v.to_string(),
        ConstantValue::Guid(v) => v.hyphenated().to_string(),
        ConstantValue::Time(v) => v.format(TIME_FORMAT).to_string(),
        ConstantValue::Binary(_)
        | ConstantValue::String(_)
        | ConstantValue::DateTime(_)
        | ConstantValue::DateTimeOffset(_)
        | ConstantValue::Geometry(_)
        | ConstantValue::Geography(_)
        | ConstantValue::HierarchyId(_) => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
    use plankey_core::{EdmType, Facet};
    use pretty_assertions::assert_eq;

    fn render(value: ConstantValue, ty: TypeUsage) -> PlanKeyResult<String> {
        let mut key = String::new();
        append_constant(&mut key, &value, &ty)?;
        Ok(key)
    }

    fn prim(kind: PrimitiveTypeKind) -> TypeUsage {
        TypeUsage::primitive(kind)
    }

    #[test]
    fn test_integers_carry_their_type() {
        assert_eq!(
            render(ConstantValue::Int32(1), prim(PrimitiveTypeKind::Int32)).unwrap(),
            "1:Edm.Int32"
        );
        assert_eq!(
            render(ConstantValue::Int64(1), prim(PrimitiveTypeKind::Int64)).unwrap(),
            "1:Edm.Int64"
        );
        assert_eq!(
            render(ConstantValue::SByte(-8), prim(PrimitiveTypeKind::SByte)).unwrap(),
            "-8:Edm.SByte"
        );
    }

    #[test]
    fn test_string_is_quoted_and_escaped() {
        let ty = TypeUsage::with_facets(
            EdmType::primitive(PrimitiveTypeKind::String),
            &[Facet::new("MaxLength", "50")],
        );
        assert_eq!(
            render(ConstantValue::String("O'Brien".into()), ty).unwrap(),
            "'O''Brien':Edm.String(MaxLength=50)"
        );
    }

    #[test]
    fn test_binary_is_uppercase_hex() {
        assert_eq!(
            render(
                ConstantValue::Binary(vec![0x00, 0xAB, 0x7f]),
                prim(PrimitiveTypeKind::Binary)
            )
            .unwrap(),
            "'00AB7F':Edm.Binary"
        );
    }

    #[test]
    fn test_boolean_and_floats() {
        assert_eq!(
            render(ConstantValue::Boolean(true), TypeUsage::boolean()).unwrap(),
            "True:Edm.Boolean"
        );
        assert_eq!(
            render(ConstantValue::Double(0.1), prim(PrimitiveTypeKind::Double)).unwrap(),
            "0.1:Edm.Double"
        );
    }

    #[test]
    fn test_temporal_values() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_milli_opt(13, 5, 9, 250)
            .unwrap();
        assert_eq!(
            render(ConstantValue::DateTime(dt), prim(PrimitiveTypeKind::DateTime)).unwrap(),
            "2024-02-29T13:05:09.250000000:Edm.DateTime"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dto = offset.from_local_datetime(&dt).unwrap();
        assert_eq!(
            render(
                ConstantValue::DateTimeOffset(dto),
                prim(PrimitiveTypeKind::DateTimeOffset)
            )
            .unwrap(),
            "2024-02-29T13:05:09.250000000+02:00:Edm.DateTimeOffset"
        );

        let t = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(
            render(ConstantValue::Time(t), prim(PrimitiveTypeKind::Time)).unwrap(),
            "08:30:00.000000000:Edm.Time"
        );
    }

    #[test]
    fn test_spatial_includes_srid() {
        let point = SpatialValue::new(4326, "POINT (1 2)");
        assert_eq!(
            render(
                ConstantValue::Geography(point.clone()),
                prim(PrimitiveTypeKind::GeographyPoint)
            )
            .unwrap(),
            "SRID=4326;POINT (1 2):Edm.GeographyPoint"
        );
        assert!(
            render(ConstantValue::Geography(point), prim(PrimitiveTypeKind::Geometry))
                .unwrap_err()
                .is_unsupported()
        );
    }

    #[test]
    fn test_enum_uses_underlying_kind() {
        let ty = TypeUsage::new(EdmType::enumeration("Shop.Status", PrimitiveTypeKind::Int32));
        assert_eq!(render(ConstantValue::Int32(2), ty).unwrap(), "2:Shop.Status");
    }

    #[test]
    fn test_mismatched_payload_is_unsupported() {
        let err = render(ConstantValue::Int32(1), prim(PrimitiveTypeKind::String)).unwrap_err();
        assert!(err.is_unsupported());
        let err = render(ConstantValue::String("x".into()), prim(PrimitiveTypeKind::Int32))
            .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_hierarchy_id_is_unsupported() {
        let err = render(
            ConstantValue::HierarchyId("/1/2/".into()),
            prim(PrimitiveTypeKind::HierarchyId),
        )
        .unwrap_err();
        assert!(matches!(err, PlanKeyError::UnsupportedConstant { .. }));
    }

    #[test]
    fn test_non_scalar_type_is_unsupported() {
        let err = render(ConstantValue::Int32(1), TypeUsage::entity("Shop.Order")).unwrap_err();
        assert!(err.is_unsupported());
    }
}

//! User-defined conversions.
//!
//! Classes declare their implicit conversions on the [`ClassEntry`]:
//! conversion operators out (`operator double()`) and converting
//! constructors in (`Meters(double)`). Either anchors a user-defined
//! conversion sequence, with at most one standard conversion on the far
//! side of it.

use overmatch_core::{ConversionRank, DataType};
use overmatch_registry::SignatureRegistry;

use super::{Conversion, ConversionKind, standard};

/// Find a user-defined conversion from `source` to `target`.
///
/// Checked after every standard conversion has failed, so a class is
/// involved on at least one side.
pub fn find_user_conversion(
    source: &DataType,
    target: &DataType,
    registry: &SignatureRegistry,
) -> Option<Conversion> {
    // Conversion operator on the source class, optionally followed by a
    // standard conversion to the parameter type.
    if let Some(class) = registry.get_type(source.base).and_then(|e| e.as_class()) {
        for &out in &class.converts_to {
            let reaches = out == target.base
                || standard::find_standard_conversion(&DataType::simple(out), target, registry)
                    .is_some();
            if reaches {
                return Some(Conversion {
                    kind: ConversionKind::ConversionOperator {
                        class: source.base,
                        target: out,
                    },
                    rank: ConversionRank::UserDefinedConversion,
                });
            }
        }
    }

    // Converting constructor on the target class, optionally preceded by
    // a standard conversion of the argument.
    if let Some(class) = registry.get_type(target.base).and_then(|e| e.as_class()) {
        for &accepted in &class.constructible_from {
            let reaches = accepted == source.base
                || standard::find_standard_conversion(
                    source,
                    &DataType::simple(accepted),
                    registry,
                )
                .is_some();
            if reaches {
                return Some(Conversion {
                    kind: ConversionKind::ConvertingConstructor {
                        class: target.base,
                        source: accepted,
                    },
                    rank: ConversionRank::UserDefinedConversion,
                });
            }
        }
    }

    None
}

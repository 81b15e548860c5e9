// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Sink, OPT_ZERO};

/// Describes a function, including its human-readable name, system name,
/// source file, and starting line number in the source.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Function {
    /// Unique nonzero id for the function.
    pub id: Field<u64, 1, OPT_ZERO>,
    /// Name of the function, in human-readable form if available.
    pub name: Field<i64, 2, OPT_ZERO>,
    /// Name of the function, as identified by the system. For instance,
    /// it can be a C++ mangled name.
    pub system_name: Field<i64, 3, OPT_ZERO>,
    /// Source file containing the function.
    pub filename: Field<i64, 4, OPT_ZERO>,
    /// Line number in source file.
    pub start_line: Field<i64, 5, OPT_ZERO>,
}

impl Message for Function {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.id)?;
        sink.field(&self.name)?;
        sink.field(&self.system_name)?;
        sink.field(&self.filename)?;
        sink.field(&self.start_line)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Function> for crate::prost_impls::Function {
    fn from(function: &Function) -> Self {
        Self {
            id: function.id.value,
            name: function.name.value,
            system_name: function.system_name.value,
            filename: function.filename.value,
            start_line: function.start_line.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use crate::test_utils::roundtrip;

    #[test]
    fn roundtrip_function() {
        bolero::check!().with_type::<Function>().for_each(|function| {
            let decoded: prost_impls::Function = roundtrip(*function);
            assert_eq!(prost_impls::Function::from(function), decoded);
        });
    }
}

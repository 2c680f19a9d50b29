//! Declarations carried as user properties on every operation.

use crate::binding::{
    Extraction, MpDeclaration, PurposeBinding, SpDeclaration, property_declaration,
};
use crate::config::PerMessageConfig;
use crate::event::{AccessCheck, AccessKind};

/// SP on each SUBSCRIBE, MP on each PUBLISH.
///
/// A delivered message may also embed its MP; when it does not, the engine
/// falls back to the MP registered for the topic.
#[derive(Debug, Clone, Default)]
pub struct PerMessageBinding {
    config: PerMessageConfig,
}

impl PerMessageBinding {
    /// Create the binding.
    #[must_use]
    pub fn new(config: PerMessageConfig) -> Self {
        Self { config }
    }
}

impl PurposeBinding for PerMessageBinding {
    fn name(&self) -> &'static str {
        "per_message"
    }

    fn extract_sp(&self, check: &AccessCheck) -> Extraction<SpDeclaration> {
        if check.access != AccessKind::Subscribe {
            return Extraction::NotApplicable;
        }
        match property_declaration(check, &self.config.sp_key) {
            Some(filter) => Extraction::Declared(SpDeclaration {
                topic: check.topic.clone(),
                filter,
            }),
            None => Extraction::Missing,
        }
    }

    fn extract_mp(&self, check: &AccessCheck) -> Extraction<MpDeclaration> {
        let declared = property_declaration(check, &self.config.mp_key)
            .map(|filter| MpDeclaration::single(check.topic.clone(), filter));

        match (check.access, declared) {
            (AccessKind::Write | AccessKind::Read, Some(declaration)) => {
                Extraction::Declared(declaration)
            }
            (AccessKind::Write, None) => Extraction::Missing,
            _ => Extraction::NotApplicable,
        }
    }
}

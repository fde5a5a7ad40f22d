use crate::config::ValidatorConfig;
use crate::segment::SegmentTable;
use crate::stack::{CallStack, MatrixStack};

/// Which matrix types have been loaded (not multiplied) during the run.
/// Flags only ever go from unset to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixInit {
    pub projection: bool,
    pub modelview: bool,
}

impl MatrixInit {
    pub fn is_loaded(&self, projection: bool) -> bool {
        if projection {
            self.projection
        } else {
            self.modelview
        }
    }

    pub fn mark_loaded(&mut self, projection: bool) {
        if projection {
            self.projection = true;
        } else {
            self.modelview = true;
        }
    }
}

/// Everything one validation run owns. Created fresh per run, never shared.
#[derive(Debug, Clone)]
pub struct ValidatorState<'a> {
    pub config: &'a ValidatorConfig,
    pub segments: SegmentTable,
    pub call_stack: CallStack,
    pub matrix_stack: MatrixStack,
    pub initialized: MatrixInit,
}

impl<'a> ValidatorState<'a> {
    pub fn new(config: &'a ValidatorConfig) -> Self {
        ValidatorState {
            config,
            segments: SegmentTable::new(config.ram_size),
            call_stack: CallStack::new(config.max_list_depth),
            matrix_stack: MatrixStack::new(config.max_matrix_depth),
            initialized: MatrixInit::default(),
        }
    }
}

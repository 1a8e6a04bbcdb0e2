use crate::{config::Config, face::FaceFrame};
use log::trace;

/// Mock panel, to allow compiling/running tests on machines without the
/// e-paper attached
pub struct Panel;

impl Panel {
    pub fn new(_: &Config) -> anyhow::Result<Self> {
        Ok(Self)
    }

    pub fn push(&mut self, _: &FaceFrame) -> anyhow::Result<()> {
        trace!("Dropping frame, no panel attached");
        Ok(())
    }
}

use std::error::Error;

use buildlamp::core::Request;
use buildlamp::BrickBus;

/// Mock implementation of `BrickBus` that verifies the requests sent to it
/// follow a predefined script and returns a canned result for each one.
#[derive(Debug)]
pub struct ScriptedBrickBus<I: Iterator<Item = ScriptItem>> {
    iter: I,
}

impl<I: Iterator<Item = ScriptItem>> BrickBus for ScriptedBrickBus<I> {
    fn process_request(&mut self, request: Request<'_>) -> Result<(), Box<dyn Error + Send + Sync>> {
        let current_row = self.iter.next().expect("Ran out of scripted responses");
        assert_eq!(current_row.expected, request);
        current_row.response
    }

    fn disconnect(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

impl<I: Iterator<Item = ScriptItem>> ScriptedBrickBus<I> {
    pub fn new(iter: I) -> Self {
        ScriptedBrickBus { iter }
    }

    pub fn done(&mut self) {
        if self.iter.next().is_some() {
            panic!("Did not use all scripted requests");
        }
    }
}

#[derive(Debug)]
pub struct ScriptItem {
    pub expected: Request<'static>,
    pub response: Result<(), Box<dyn Error + Send + Sync>>,
}

/// A script step that succeeds.
pub fn ok(expected: Request<'static>) -> ScriptItem {
    ScriptItem {
        expected,
        response: Ok(()),
    }
}

use std::rc::Rc;

use crate::pgm::common::error::{NetworkError, Result};
use crate::pgm::common::interface::ScenarioMaker;

use super::{sprinkler::Sprinkler, student::Student};

pub struct ScenarioMakerFactory;

impl ScenarioMakerFactory {
    pub fn new_shared(name: &str) -> Result<Rc<dyn ScenarioMaker>> {
        match name {
            "student" => Ok(Rc::new(Student {})),
            "sprinkler" => Ok(Rc::new(Sprinkler {})),
            _ => Err(NetworkError::UnknownScenario(name.to_string())),
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["student", "sprinkler"]
    }
}

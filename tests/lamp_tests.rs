use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use test_case::test_case;

use buildlamp::core::{Relay, Request};
use buildlamp::{DeviceError, Lamp, LampColor, Uid};

mod scripted_bus;
use crate::scripted_bus::{ok, ScriptItem, ScriptedBrickBus};

const RELAY: Uid = Uid(0x1234);

#[test_case("red", true, false ; "red")]
#[test_case("green", false, true ; "green")]
#[test_case("yellow", false, false ; "yellow")]
#[test_case("off", true, true ; "off")]
#[test_case("purple", true, true ; "unknown color")]
#[test_case("", true, true ; "empty color")]
#[test_case("Red", true, true ; "names are case sensitive")]
fn set_color_by_name(color: &str, relay1: bool, relay2: bool) {
    let bus = ScriptedBrickBus::new(vec![ok(Request::SetRelayState(RELAY, relay1, relay2))].into_iter());
    let bus = Rc::new(RefCell::new(bus));

    let lamp = Lamp::new(bus.clone(), RELAY);
    lamp.set_color(color).unwrap();

    bus.borrow_mut().done();
}

#[test]
fn named_setters() {
    let script = vec![
        ok(Request::SetRelayState(RELAY, true, false)),
        ok(Request::SetRelayState(RELAY, false, true)),
        ok(Request::SetRelayState(RELAY, false, false)),
        ok(Request::SetRelayState(RELAY, true, true)),
    ];
    let bus = Rc::new(RefCell::new(ScriptedBrickBus::new(script.into_iter())));

    let lamp = Lamp::new(bus.clone(), RELAY);
    lamp.set_red().unwrap();
    lamp.set_green().unwrap();
    lamp.set_yellow().unwrap();
    lamp.off().unwrap();

    bus.borrow_mut().done();
}

#[test]
fn blinks_use_monoflop() {
    let second = Duration::from_millis(1000);
    let script = vec![
        ok(Request::SetMonoflop(RELAY, Relay::One, true, second)),
        ok(Request::SetMonoflop(RELAY, Relay::Two, true, second)),
    ];
    let bus = Rc::new(RefCell::new(ScriptedBrickBus::new(script.into_iter())));

    let lamp = Lamp::new(bus.clone(), RELAY);
    lamp.blink_red_once().unwrap();
    lamp.blink_green_once().unwrap();

    bus.borrow_mut().done();
}

#[test]
fn set_color_from_lamp_color() {
    let bus = ScriptedBrickBus::new(vec![ok(Request::SetRelayState(RELAY, false, true))].into_iter());
    let bus = Rc::new(RefCell::new(bus));

    Lamp::new(bus.clone(), RELAY).set_color(LampColor::Green).unwrap();

    bus.borrow_mut().done();
}

#[test]
fn bus_failure_propagates() {
    let script = vec![ScriptItem {
        expected: Request::SetRelayState(RELAY, true, false),
        response: Err("Dummy bus error".into()),
    }];
    let bus = Rc::new(RefCell::new(ScriptedBrickBus::new(script.into_iter())));

    let error = Lamp::new(bus.clone(), RELAY).set_red().unwrap_err();
    assert!(matches!(error, DeviceError::Bus { .. }));
    assert_eq!("Dummy bus error", std::error::Error::source(&error).unwrap().to_string());

    bus.borrow_mut().done();
}

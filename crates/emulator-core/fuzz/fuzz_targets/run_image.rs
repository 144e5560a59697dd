#![no_main]

use libfuzzer_sys::fuzz_target;
use qproc_core::{
    disassemble, EmulatorConfig, FrameCapture, Host, Machine, ProgramImage, ScriptedConsole,
};

fuzz_target!(|data: &[u8]| {
    let _ = disassemble(data);

    let Ok(image) = ProgramImage::from_bytes(data.to_vec()) else {
        return;
    };
    let config = EmulatorConfig {
        max_steps: Some(10_000),
        ..EmulatorConfig::default()
    };
    let mut machine = Machine::new(&image, config);
    let mut console = ScriptedConsole::new(data.iter().map(|byte| i32::from(*byte)));
    let mut frames = FrameCapture::default();
    let _ = machine.run(&mut Host::new(&mut console).with_frame(&mut frames));
});

use cortex_m::interrupt as cpu;
use cortex_m::register::primask;
use cortex_m_rt::entry;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::InterruptExecutor;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level as PinLevel, Output, Pull, Speed};
use embassy_stm32::interrupt::{self, InterruptExt, Priority};
use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::{self, UartTx};
use flicker_core::controller::{FlickerController, PollError};
use flicker_core::mailbox::ActionMailbox;
use flicker_core::time::Clock;

use crate::clock::EmbassyClock;
use crate::config;
use crate::hw::{LedPin, Potentiometer};
use crate::serial::SerialSink;
use crate::telemetry::{self, TelemetryLog};

mod button_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        cpu::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                cpu::enable();
            }
        }
    }
}

/// Single-slot hand-off between the button task and the polling loop.
pub(super) static MAILBOX: ActionMailbox = ActionMailbox::new();

/// Runs the button task from the I2C1 vector, which is otherwise unused on
/// this board, so edges preempt the thread-mode polling loop.
static BUTTON_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn I2C1() {
    unsafe { BUTTON_EXECUTOR.on_interrupt() }
}

type SerialPort = SerialSink<UartTx<'static, Blocking>>;

#[entry]
fn main() -> ! {
    let hal::Peripherals {
        PA0,
        PA2,
        PA5,
        PC13,
        EXTI13,
        ADC1,
        USART2,
        ..
    } = hal::init(hal::Config::default());

    telemetry::log_startup(&config::PINS);

    let led = LedPin::new(Output::new(PA5, PinLevel::Low, Speed::Low));
    let pot = Potentiometer::new(Adc::new(ADC1), PA0.degrade_adc());
    let button = ExtiInput::new(PC13, EXTI13, Pull::Down);

    let mut uart_config = usart::Config::default();
    uart_config.baudrate = config::SERIAL_BAUD;
    let serial = UartTx::new_blocking(USART2, PA2, uart_config).expect("usart2 configuration");

    interrupt::I2C1.set_priority(Priority::P1);
    let spawner = BUTTON_EXECUTOR.start(interrupt::I2C1);
    spawner
        .spawn(button_task::run(button, &MAILBOX))
        .expect("failed to spawn button task");

    poll_forever(led, pot, SerialSink::new(serial))
}

fn poll_forever(led: LedPin<'static>, mut pot: Potentiometer<'static>, mut serial: SerialPort) -> ! {
    let clock = EmbassyClock;
    let mut log = TelemetryLog::new();
    let mut controller = match FlickerController::new(led, &MAILBOX, clock.now()) {
        Ok(controller) => controller,
        Err(never) => match never {},
    };

    loop {
        let sample = pot.sample();
        match controller.poll(clock.now(), sample, &mut serial) {
            Ok(outcome) => {
                if outcome.report.is_some() {
                    log.drain(controller.telemetry());
                }
            }
            Err(PollError::Led(never)) => match never {},
            Err(PollError::Sink(err)) => {
                defmt::warn!("report dropped: {}", defmt::Debug2Format(&err));
                log.drain(controller.telemetry());
            }
        }
    }
}

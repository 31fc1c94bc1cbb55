use stm32f4xx_hal::{
    pac::{USART1, USART2},
    serial::{Rx, Tx},
};

/// Log sink, TX only on PA9
pub type DebugSerialPort = Tx<USART1>;

/// Operator console on PA2/PA3: commands come in, reports go out
pub type ConsoleTx = Tx<USART2>;
pub type ConsoleRx = Rx<USART2>;

pub mod tradingeconomics;

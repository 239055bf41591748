mod common;
mod faults;
mod limits;
mod scenarios;
mod transitions;

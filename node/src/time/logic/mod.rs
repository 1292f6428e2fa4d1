pub(crate) mod lamport_clock;

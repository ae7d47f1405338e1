pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod frame_loop;
pub(crate) mod text;

mod shell;
mod wayland;

mod hooks;
mod namespaces;
mod output;

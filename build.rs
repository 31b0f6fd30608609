use cfg_aliases::cfg_aliases;

fn main() {
    // Setup cfg aliases
    cfg_aliases! {
        os_alsa: { target_os = "linux" }
    }
}

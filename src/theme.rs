pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        // Badge text
        pub const CRUST: Color = Color::Rgb(17, 17, 27);
        pub const TEXT: Color = Color::Rgb(205, 214, 244);

        // Badge backgrounds
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
        pub const SURFACE2: Color = Color::Rgb(88, 91, 112);
    }
}

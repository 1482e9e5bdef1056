fn main() {
    emotion_guess::run();
}

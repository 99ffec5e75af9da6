fn main() {
    shmup_encounter::game::run();
}

fn main() -> anyhow::Result<()> {
    dvmbasic_rust::run()
}

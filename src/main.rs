fn main() -> anyhow::Result<()> {
    bariatric_equipment::run()
}
